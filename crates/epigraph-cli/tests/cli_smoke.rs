//! Smoke tests: drive the `epigraph` binary against a temp local store.

use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempStoreGuard {
    path: PathBuf,
}

impl TempStoreGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "epigraph-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp store should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn seed(&self) {
        let index = json!({
            "meta": { "modified": "2024-03-01T10:20:30Z" },
            "data": [
                { "id": "a", "scr": "latin", "chr": "A",
                  "img": "https://img.example.org/inscription_images/ISic000001/ISic000001_tiled.tif",
                  "doc": "http://docs.example.org/inscription/ISic000001.xml" },
                { "id": "b", "scr": "latin", "chr": "B", "tag": ["m.exemplar"],
                  "img": "https://img.example.org/inscription_images/ISic000002/ISic000002_tiled.tif",
                  "doc": "http://docs.example.org/inscription/ISic000002.xml" },
                { "id": "c", "scr": "greek", "chr": "alpha",
                  "img": "https://img.example.org/inscription_images/ISic000003/ISic000003_tiled.tif",
                  "doc": "http://docs.example.org/inscription/ISic000003.xml" }
            ]
        });
        let queue = json!({
            "changes": [{
                "annotations": [{ "id": "a" }, { "id": "b" }],
                "tags": ["k.round"],
                "creator": "reviewer-x",
                "created": "2024-03-02T00:00:00Z"
            }]
        });
        self.write("app/index.json", &index);
        self.write("annotations/change-queue.json", &queue);
    }

    fn write(&self, rel: &str, value: &Value) {
        let target = self.path.join(rel);
        fs::create_dir_all(target.parent().expect("resource paths have parents"))
            .expect("store subdir should be created");
        fs::write(
            &target,
            serde_json::to_string_pretty(value).expect("fixture should encode"),
        )
        .expect("fixture should write");
    }

    fn read(&self, rel: &str) -> Value {
        let raw = fs::read_to_string(self.path.join(rel)).expect("resource should exist");
        serde_json::from_str(&raw).expect("resource should parse")
    }
}

impl Drop for TempStoreGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_epigraph<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_epigraph");
    Command::new(bin)
        .args(args)
        .output()
        .expect("epigraph command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn store_arg(guard: &TempStoreGuard) -> String {
    guard.path().display().to_string()
}

#[test]
fn apply_replays_and_writes_the_effective_index() {
    let store = TempStoreGuard::new("apply");
    store.seed();
    let out = store.path().join("effective.json");

    let output = run_epigraph([
        "apply",
        "--store",
        &store_arg(&store),
        "--out",
        &out.display().to_string(),
        "--json",
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["action"], json!("apply"));
    assert_eq!(payload["items"], json!(3));
    assert_eq!(payload["changes"], json!(1));

    let effective: Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("effective index should exist"))
            .expect("effective index should parse");
    let tags_of_a = effective["data"]
        .as_array()
        .expect("data should be a list")
        .iter()
        .find(|item| item["id"] == json!("a"))
        .expect("item a should be present")["tag"]
        .clone();
    assert_eq!(tags_of_a, json!(["k.round"]));
}

#[test]
fn search_filters_on_the_effective_tags() {
    let store = TempStoreGuard::new("search");
    store.seed();

    let output = run_epigraph([
        "search",
        "--store",
        &store_arg(&store),
        "--facet",
        "tag=k.round",
        "--json",
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    let items = payload["results"]["items"]
        .as_array()
        .expect("items should be a list");
    let ids: Vec<&str> = items
        .iter()
        .map(|item| item["id"].as_str().expect("items carry ids"))
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(payload["results"]["pagination"]["total"], json!(2));
}

#[test]
fn search_rejects_unknown_facet_keys() {
    let store = TempStoreGuard::new("badfacet");
    store.seed();

    let output = run_epigraph([
        "search",
        "--store",
        &store_arg(&store),
        "--facet",
        "nope=latin",
    ]);
    assert_failure(&output);
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("unknown facet key"),
        "stderr should name the bad key"
    );
}

#[test]
fn tag_commits_a_change_record() {
    let store = TempStoreGuard::new("tag");
    store.seed();

    let output = run_epigraph([
        "tag",
        "--store",
        &store_arg(&store),
        "--item",
        "c",
        "--add",
        "k.round",
        "--remove",
        "m.exemplar",
        "--creator",
        "reviewer-cli",
        "--json",
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["queueLength"], json!(2));

    let queue = store.read("annotations/change-queue.json");
    let record = &queue["changes"][1];
    assert_eq!(record["creator"], json!("reviewer-cli"));
    assert_eq!(record["tags"], json!(["k.round", "-m.exemplar"]));
    assert_eq!(record["annotations"][0]["id"], json!("c"));
    assert!(
        record["annotations"][0]["file"]
            .as_str()
            .expect("file reference should be recorded")
            .ends_with(".json")
    );
}

#[test]
fn tag_rejects_unknown_item_ids() {
    let store = TempStoreGuard::new("tag-unknown");
    store.seed();

    let output = run_epigraph([
        "tag",
        "--store",
        &store_arg(&store),
        "--item",
        "ghost",
        "--add",
        "k.round",
    ]);
    assert_failure(&output);
}

#[test]
fn queue_check_reports_unknown_annotation_ids() {
    let store = TempStoreGuard::new("check");
    store.seed();
    store.write(
        "annotations/change-queue.json",
        &json!({
            "changes": [
                { "annotations": [{ "id": "ghost" }], "tags": ["k.round"] },
                { "annotations": [{ "id": "a" }], "tags": ["Not A Tag"] },
                { "annotations": [], "tags": [] }
            ]
        }),
    );

    let output = run_epigraph([
        "queue",
        "check",
        "--store",
        &store_arg(&store),
        "--json",
    ]);
    assert_failure(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["ok"], json!(false));
    let findings = payload["findings"]
        .as_array()
        .expect("findings should be a list");
    assert!(findings.iter().any(|f| {
        f.as_str()
            .is_some_and(|text| text.contains("unknown annotation id ghost"))
    }));
    assert!(findings.iter().any(|f| {
        f.as_str()
            .is_some_and(|text| text.contains("malformed tag name"))
    }));
    assert!(findings.iter().any(|f| {
        f.as_str()
            .is_some_and(|text| text.contains("references no annotations"))
    }));
}

#[test]
fn queue_list_prints_records_in_order() {
    let store = TempStoreGuard::new("list");
    store.seed();

    let output = run_epigraph(["queue", "list", "--store", &store_arg(&store), "--json"]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["count"], json!(1));
    assert_eq!(payload["items"][0]["creator"], json!("reviewer-x"));
    assert_eq!(payload["items"][0]["tags"], json!(["k.round"]));
}
