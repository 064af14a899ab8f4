use crate::support;
use epigraph_search::{FacetKey, SearchConfig, SearchState};
use serde_json::json;
use std::collections::BTreeMap;

pub struct Args {
    pub query: Vec<String>,
    pub facet: Vec<String>,
    pub page: usize,
    pub per_page: usize,
    pub store: String,
    pub index: String,
    pub queue: String,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut filters: BTreeMap<FacetKey, Vec<String>> = BTreeMap::new();
    for raw in &args.facet {
        let Some((key, value)) = raw.split_once('=') else {
            eprintln!("error: facet filter must be key=value: {raw}");
            std::process::exit(1);
        };
        let key: FacetKey = key.parse().unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        });
        filters.entry(key).or_default().push(value.to_string());
    }

    let (effective, _, _) =
        support::load_effective_or_exit(&args.store, &args.index, &args.queue);

    let state = SearchState {
        query: args.query.join(" "),
        filters,
        page: args.page,
        per_page: args.per_page,
    };
    let result = epigraph_search::search(&effective, &state, &SearchConfig::default());

    if args.json {
        let payload = json!({
            "action": "search",
            "results": result,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        let pagination = &result.pagination;
        println!(
            "epigraph search\n  Matches: {} (page {}/{}, {} per page)",
            pagination.total,
            pagination.page,
            pagination.page_count.max(1),
            pagination.per_page
        );
        for item in &result.items {
            let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
            println!(
                "  - {} [{} {}] doc={} tags={}",
                item.id,
                item.script,
                item.allograph,
                item.doc_id(),
                tags.join(",")
            );
        }
        for (key, buckets) in &result.aggregations {
            if buckets.is_empty() {
                continue;
            }
            println!("  {}:", key.title());
            for bucket in buckets {
                let marker = if bucket.selected { "*" } else { " " };
                println!("   {marker} {} ({})", bucket.key, bucket.count);
            }
        }
    }
}
