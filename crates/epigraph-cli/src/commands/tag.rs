use chrono::Utc;
use epigraph_edit::{CommitEditError, ReviewSession};
use epigraph_queue::{LocalStore, VARIANT_RULES_PATH};
use serde_json::json;

pub struct Args {
    pub item: Vec<String>,
    pub add: Vec<String>,
    pub remove: Vec<String>,
    pub creator: String,
    pub store: String,
    pub index: String,
    pub queue: String,
    pub json: bool,
}

pub fn run(args: Args) {
    if args.add.is_empty() && args.remove.is_empty() {
        eprintln!("error: nothing to do: pass --add and/or --remove");
        std::process::exit(1);
    }

    let client = LocalStore::new(&args.store, &args.creator);
    let mut session =
        ReviewSession::with_paths(client, &args.index, &args.queue, VARIANT_RULES_PATH);
    session.load();

    for id in &args.item {
        if session.index().item(id).is_none() {
            eprintln!("error: unknown annotation id: {id}");
            std::process::exit(1);
        }
        session.staging_mut().toggle_item(id);
    }
    for tag in &args.add {
        session.staging_mut().cycle_tag(tag); // Unset → Add
    }
    for tag in &args.remove {
        session.staging_mut().cycle_tag(tag);
        session.staging_mut().cycle_tag(tag); // Unset → Add → Remove
    }

    match session.commit_edit(Utc::now()) {
        Ok(()) => {}
        Err(CommitEditError::Staging(err)) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
        Err(CommitEditError::Commit(err)) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }

    if args.json {
        let payload = json!({
            "action": "tag",
            "items": args.item,
            "added": args.add,
            "removed": args.remove,
            "creator": args.creator,
            "queueLength": session.queue().len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!(
            "epigraph tag\n  Items: {}\n  Added: {}\n  Removed: {}\n  Queue length: {}",
            args.item.join(", "),
            args.add.join(", "),
            args.remove.join(", "),
            session.queue().len()
        );
    }
}
