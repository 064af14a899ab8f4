//! The persisted change queue: an ordered, append-only record sequence.

use crate::record::ChangeRecord;
use serde::{Deserialize, Serialize};

/// Wire document of the persisted queue: `{ "changes": [...] }`.
///
/// Records only ever accumulate at the tail; replay order is element
/// order. The version token of the persisted copy is owned by the
/// store layer, not by this value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQueue {
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
}

impl ChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Append one record at the tail.
    pub fn append(&mut self, record: ChangeRecord) {
        self.changes.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_parses_missing_changes_as_empty() {
        let queue: ChangeQueue = serde_json::from_str("{}").expect("queue must parse");
        assert!(queue.is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let mut queue = ChangeQueue::new();
        queue.append(ChangeRecord::new(
            Vec::new(),
            vec!["k.round".to_string()],
            "a",
            chrono::DateTime::UNIX_EPOCH,
        ));
        queue.append(ChangeRecord::new(
            Vec::new(),
            vec!["-k.round".to_string()],
            "b",
            chrono::DateTime::UNIX_EPOCH,
        ));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.changes[0].creator, "a");
        assert_eq!(queue.changes[1].creator, "b");
    }
}
