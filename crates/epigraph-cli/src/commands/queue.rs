use crate::support;
use epigraph_index::TagRegistry;
use epigraph_queue::LocalStore;
use serde_json::json;

pub fn run_list(store: String, queue: String, json_output: bool) {
    let client = LocalStore::new(&store, support::OFFLINE_USER);
    let queue_store = support::load_queue_or_exit(&client, &queue);

    if json_output {
        let items = queue_store
            .changes()
            .iter()
            .enumerate()
            .map(|(at, record)| {
                json!({
                    "position": at,
                    "creator": record.creator,
                    "created": record.created.to_rfc3339(),
                    "annotations": record.annotations.len(),
                    "tags": record.tags,
                })
            })
            .collect::<Vec<_>>();
        let payload = json!({
            "action": "queue.list",
            "path": queue,
            "count": items.len(),
            "items": items,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!(
            "epigraph queue list\n  Path: {}\n  Count: {}",
            queue,
            queue_store.len()
        );
        for (at, record) in queue_store.changes().iter().enumerate() {
            println!(
                "  - #{at} {} by {}: {} annotation(s), tags [{}]",
                record.created.to_rfc3339(),
                if record.creator.is_empty() {
                    "<unknown>"
                } else {
                    &record.creator
                },
                record.annotations.len(),
                record.tags.join(", ")
            );
        }
    }
}

pub fn run_check(store: String, index: String, queue: String, json_output: bool) {
    let client = LocalStore::new(&store, support::OFFLINE_USER);
    let effective = support::load_index_or_exit(&client, &index);
    let queue_store = support::load_queue_or_exit(&client, &queue);

    let gate = TagRegistry::new();
    let mut findings: Vec<String> = Vec::new();
    for (at, record) in queue_store.changes().iter().enumerate() {
        if record.annotations.is_empty() {
            findings.push(format!("record #{at} references no annotations"));
        }
        if record.tags.is_empty() {
            findings.push(format!("record #{at} carries no tag tokens"));
        }
        for annotation in &record.annotations {
            if effective.item(&annotation.id).is_none() {
                findings.push(format!(
                    "record #{at} references unknown annotation id {}",
                    annotation.id
                ));
            }
        }
        for op in record.tag_ops() {
            let name = op.name();
            if gate.name_error(name).is_some() {
                findings.push(format!("record #{at} carries malformed tag name {name:?}"));
            }
        }
    }

    if json_output {
        let payload = json!({
            "action": "queue.check",
            "path": queue,
            "records": queue_store.len(),
            "findings": findings,
            "ok": findings.is_empty(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!(
            "epigraph queue check\n  Path: {}\n  Records: {}\n  Findings: {}",
            queue,
            queue_store.len(),
            findings.len()
        );
        for finding in &findings {
            println!("  - {finding}");
        }
    }

    if !findings.is_empty() {
        std::process::exit(1);
    }
}
