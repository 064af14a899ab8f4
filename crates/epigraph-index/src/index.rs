//! Published base index and its canonical in-memory projection.
//!
//! The published document is read-only to this core: the reconciliation
//! engine mutates tags on the in-memory projection only.

use crate::item::IndexItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Errors raised while loading the base index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to read index {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse index: {0}")]
    Parse(String),
}

fn default_modified() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// Metadata block of the published index document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    #[serde(default = "default_modified")]
    pub modified: DateTime<Utc>,
}

impl Default for IndexMeta {
    fn default() -> Self {
        Self {
            modified: default_modified(),
        }
    }
}

/// The published index wire document: `{ "meta": {...}, "data": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseIndex {
    #[serde(default)]
    pub meta: IndexMeta,
    #[serde(default)]
    pub data: Vec<IndexItem>,
}

impl BaseIndex {
    /// Parse the published document from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, IndexError> {
        serde_json::from_str(raw).map_err(|e| IndexError::Parse(e.to_string()))
    }

    /// Parse the published document from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, IndexError> {
        serde_json::from_value(value).map_err(|e| IndexError::Parse(e.to_string()))
    }

    /// Read and parse the published document from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| IndexError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }
}

/// Canonical in-memory state of the annotation index.
///
/// Items are keyed by id in deterministic order. Duplicate ids in the
/// published document resolve last-write-wins, matching overlay behavior
/// in index rebuild workflows.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    modified: DateTime<Utc>,
    items: BTreeMap<String, IndexItem>,
}

impl AnnotationIndex {
    /// Build the projection from a published document.
    pub fn from_base(base: BaseIndex) -> Self {
        let mut items = BTreeMap::new();
        for item in base.data {
            let id = item.id.clone();
            items.insert(id, item);
        }
        Self {
            modified: base.meta.modified,
            items,
        }
    }

    /// The fallback index used when the published document cannot be
    /// loaded: empty, with a sentinel modification date.
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Total number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds zero items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lookup one item by id.
    pub fn item(&self, id: &str) -> Option<&IndexItem> {
        self.items.get(id)
    }

    /// Lookup one item by id (mutable).
    pub fn item_mut(&mut self, id: &str) -> Option<&mut IndexItem> {
        self.items.get_mut(id)
    }

    /// Iterate all items in deterministic id order.
    pub fn items(&self) -> impl Iterator<Item = &IndexItem> {
        self.items.values()
    }

    /// Render the projection back to a publishable wire document.
    pub fn to_base(&self) -> BaseIndex {
        BaseIndex {
            meta: IndexMeta {
                modified: self.modified,
            },
            data: self.items.values().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> IndexItem {
        IndexItem::new(id)
    }

    #[test]
    fn from_base_resolves_duplicate_ids_last_write_wins() {
        let mut first = item("a1");
        first.script = "latin".to_string();
        let mut second = item("a1");
        second.script = "greek".to_string();

        let index = AnnotationIndex::from_base(BaseIndex {
            meta: IndexMeta::default(),
            data: vec![first, second],
        });

        assert_eq!(index.len(), 1);
        assert_eq!(
            index.item("a1").expect("item must exist after dedupe").script,
            "greek"
        );
    }

    #[test]
    fn items_iterate_in_id_order() {
        let index = AnnotationIndex::from_base(BaseIndex {
            meta: IndexMeta::default(),
            data: vec![item("b2"), item("a1"), item("c3")],
        });

        let ids: Vec<&str> = index.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn base_index_parses_wire_document() {
        let raw = r#"{
            "meta": { "modified": "2024-03-01T10:20:30Z" },
            "data": [ { "id": "a1", "scr": "latin" } ]
        }"#;

        let base = BaseIndex::from_json_str(raw).expect("document must parse");
        assert_eq!(base.data.len(), 1);
        assert_eq!(base.meta.modified.to_rfc3339(), "2024-03-01T10:20:30+00:00");
    }

    #[test]
    fn base_index_tolerates_missing_meta() {
        let base = BaseIndex::from_json_str(r#"{ "data": [] }"#).expect("document must parse");
        assert_eq!(base.meta.modified, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn fallback_index_is_empty() {
        let index = AnnotationIndex::fallback();
        assert!(index.is_empty());
        assert_eq!(index.modified(), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn to_base_round_trips_items() {
        let index = AnnotationIndex::from_base(BaseIndex {
            meta: IndexMeta::default(),
            data: vec![item("b2"), item("a1")],
        });

        let base = index.to_base();
        let ids: Vec<&str> = base.data.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2"]);
    }
}
