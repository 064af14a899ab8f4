//! Reconciliation engine: replay change records onto the base index.
//!
//! One implementation, shared by the live review session and the offline
//! queue-processing job. Replay is deterministic: same base index + same
//! queue order ⇒ same effective tags, across process restarts.

use crate::record::{ChangeRecord, TagOp};
use epigraph_index::{AnnotationIndex, TagRegistry};

/// Replay every record onto the index in queue order.
///
/// Equivalent to calling [`apply_record`] once per record. The index
/// becomes the *effective* dataset: base tags plus all queued edits.
pub fn replay_queue(index: &mut AnnotationIndex, changes: &[ChangeRecord], tags: &mut TagRegistry) {
    for change in changes {
        apply_record(index, change, tags);
    }
}

/// Apply one record: for every referenced annotation present in the index,
/// apply the record's signed tag tokens in order.
///
/// Additions register the bare name with the vocabulary. Annotation ids
/// missing from the index are skipped silently: queued edits may
/// reference items later excluded from a rebuilt index, which is a
/// recoverable condition rather than an error.
pub fn apply_record(index: &mut AnnotationIndex, change: &ChangeRecord, tags: &mut TagRegistry) {
    for annotation in &change.annotations {
        let Some(item) = index.item_mut(&annotation.id) else {
            tracing::debug!(
                annotation_id = %annotation.id,
                "change record references an annotation missing from the index"
            );
            continue;
        };
        for op in change.tag_ops() {
            match op {
                TagOp::Remove(name) => {
                    item.tags.remove(name);
                }
                TagOp::Add(name) => {
                    item.tags.insert(name.to_string());
                    tags.register(name);
                }
            }
        }
    }
}
