use crate::support;
use serde_json::json;
use std::fs;
use std::path::Path;

pub fn run(store: String, index: String, queue: String, out: Option<String>, json_output: bool) {
    let (effective, registry, change_count) =
        support::load_effective_or_exit(&store, &index, &queue);

    let out_path = out.map(|path| {
        let document = effective.to_base();
        let raw = serde_json::to_string_pretty(&document).unwrap_or_else(|e| {
            eprintln!("error: failed to encode effective index: {e}");
            std::process::exit(1);
        });
        if let Err(e) = fs::write(Path::new(&path), raw + "\n") {
            eprintln!("error: failed to write {path}: {e}");
            std::process::exit(1);
        }
        path
    });

    if json_output {
        let payload = json!({
            "action": "apply",
            "items": effective.len(),
            "changes": change_count,
            "knownTags": registry.len(),
            "out": out_path,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!(
            "epigraph apply\n  Items: {}\n  Changes replayed: {}\n  Known tags: {}",
            effective.len(),
            change_count,
            registry.len()
        );
        if let Some(path) = out_path {
            println!("  Effective index written to: {path}");
        }
    }
}
