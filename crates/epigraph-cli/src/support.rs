use epigraph_index::{AnnotationIndex, BaseIndex, TagRegistry};
use epigraph_queue::{ChangeQueueStore, LocalStore, VersionedStore, replay_queue};

/// User id recorded by non-interactive store access.
pub const OFFLINE_USER: &str = "offline-job";

pub fn load_index_or_exit(client: &LocalStore, path: &str) -> AnnotationIndex {
    let read = client.read_json(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let base = BaseIndex::from_value(read.value).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    AnnotationIndex::from_base(base)
}

pub fn load_queue_or_exit(client: &LocalStore, path: &str) -> ChangeQueueStore {
    let mut store = ChangeQueueStore::new(path);
    if let Err(e) = store.load(client) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    store
}

/// Seed the vocabulary from the tags already present in the index.
pub fn seed_registry(index: &AnnotationIndex) -> TagRegistry {
    let mut registry = TagRegistry::new();
    for item in index.items() {
        for tag in &item.tags {
            registry.register(tag);
        }
    }
    registry
}

/// Load the base index and queue, then replay: the effective dataset.
pub fn load_effective_or_exit(
    store_root: &str,
    index_path: &str,
    queue_path: &str,
) -> (AnnotationIndex, TagRegistry, usize) {
    let client = LocalStore::new(store_root, OFFLINE_USER);
    let mut index = load_index_or_exit(&client, index_path);
    let queue = load_queue_or_exit(&client, queue_path);
    let mut registry = seed_registry(&index);
    replay_queue(&mut index, queue.changes(), &mut registry);
    (index, registry, queue.len())
}
