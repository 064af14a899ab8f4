//! One review session: load, reconcile, stage, save.
//!
//! The session is the single active mutator of its in-memory state; all
//! cross-session coordination happens through the CAS precondition on the
//! store commits. Every failure degrades to a notice and a safe,
//! previous-consistent state; nothing here is fatal.

use chrono::{DateTime, Utc};
use epigraph_index::{AnnotationIndex, BaseIndex, TagRegistry, annotation_file_ref};
use epigraph_queue::{
    CHANGE_QUEUE_PATH, ChangeQueueStore, CommitError, VARIANT_RULES_PATH, VariantRule,
    VariantRuleStore, VersionedStore, apply_record, replay_queue,
};

use crate::staging::{EditStaging, StagingError};

/// Default store path of the published index.
pub const INDEX_PATH: &str = "app/index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One user-visible message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub content: String,
    pub created: DateTime<Utc>,
}

/// Why a commit-edit flow did not complete.
#[derive(Debug, thiserror::Error)]
pub enum CommitEditError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// One user session over the effective dataset.
pub struct ReviewSession<S: VersionedStore> {
    client: S,
    index_path: String,
    index: AnnotationIndex,
    tags: TagRegistry,
    queue: ChangeQueueStore,
    rules: VariantRuleStore,
    staging: EditStaging,
    notices: Vec<Notice>,
}

impl<S: VersionedStore> ReviewSession<S> {
    pub fn new(client: S) -> Self {
        Self::with_paths(client, INDEX_PATH, CHANGE_QUEUE_PATH, VARIANT_RULES_PATH)
    }

    pub fn with_paths(
        client: S,
        index_path: impl Into<String>,
        queue_path: impl Into<String>,
        rules_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            index_path: index_path.into(),
            index: AnnotationIndex::fallback(),
            tags: TagRegistry::new(),
            queue: ChangeQueueStore::new(queue_path),
            rules: VariantRuleStore::new(rules_path),
            staging: EditStaging::new(),
            notices: Vec::new(),
        }
    }

    /// Load (or re-load) the shared state and reconcile.
    ///
    /// Each resource degrades independently: a failed queue read leaves
    /// an empty queue with the unread token (so no write can target an
    /// unconfirmed base), a failed index read leaves the fallback index.
    /// Either failure surfaces as a warning notice and the session stays
    /// usable read-only. The staged edit is left untouched, so a reload
    /// after a conflict preserves the user's pending work.
    pub fn load(&mut self) {
        if let Err(err) = self.rules.load(&self.client) {
            self.notice(
                NoticeLevel::Warning,
                format!("Failed to load variant rules ({err})"),
            );
        }
        if let Err(err) = self.queue.load(&self.client) {
            self.notice(
                NoticeLevel::Warning,
                format!("Failed to load change queue ({err})"),
            );
        }

        self.index = match self
            .client
            .read_json(&self.index_path)
            .map_err(|e| e.to_string())
            .and_then(|read| BaseIndex::from_value(read.value).map_err(|e| e.to_string()))
        {
            Ok(base) => AnnotationIndex::from_base(base),
            Err(message) => {
                self.notice(
                    NoticeLevel::Warning,
                    format!("Failed to load search index ({message})"),
                );
                AnnotationIndex::fallback()
            }
        };

        self.tags = TagRegistry::new();
        for item in self.index.items() {
            for tag in &item.tags {
                self.tags.register(tag);
            }
        }

        replay_queue(&mut self.index, self.queue.changes(), &mut self.tags);
    }

    /// The effective dataset: base index plus every queued edit.
    pub fn index(&self) -> &AnnotationIndex {
        &self.index
    }

    pub fn vocabulary(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn queue(&self) -> &ChangeQueueStore {
        &self.queue
    }

    pub fn variant_rules(&self) -> &[VariantRule] {
        self.rules.value()
    }

    pub fn staging(&self) -> &EditStaging {
        &self.staging
    }

    pub fn staging_mut(&mut self) -> &mut EditStaging {
        &mut self.staging
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn can_edit(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Save the staged edit: build a record, append it, CAS-commit the
    /// queue, then fold the record into the live effective index.
    ///
    /// On conflict the staged edit is preserved un-cleared; the user
    /// re-loads and saves again. The conflicted record stays in the
    /// unconfirmed in-memory queue until that re-load replaces it. It
    /// can never persist, since any successful commit requires a token
    /// the stale queue does not have.
    pub fn commit_edit(&mut self, now: DateTime<Utc>) -> Result<(), CommitEditError> {
        let record = self.staging.build_record(
            self.client.user_id(),
            |id| {
                self.index
                    .item(id)
                    .map(annotation_file_ref)
                    .unwrap_or_default()
            },
            now,
        )?;

        self.queue.append(record.clone());
        match self.queue.commit(&mut self.client) {
            Ok(_) => {
                apply_record(&mut self.index, &record, &mut self.tags);
                let count = record.annotations.len();
                self.staging.clear();
                self.notice(
                    NoticeLevel::Info,
                    format!("Saved changes to {count} annotation(s)"),
                );
                Ok(())
            }
            Err(err @ CommitError::Conflict { .. }) => {
                self.notice(
                    NoticeLevel::Error,
                    "Someone else saved changes first. Reload and save again.".to_string(),
                );
                Err(err.into())
            }
            Err(err) => {
                self.notice(NoticeLevel::Error, format!("Failed to save changes ({err})"));
                Err(err.into())
            }
        }
    }

    /// Append a variant rule and CAS-commit the rule list.
    ///
    /// Unlike the change queue there is no staging to rebuild from, so a
    /// failed commit retracts the rule to keep the in-memory list equal
    /// to the last confirmed state.
    pub fn add_variant_rule(&mut self, rule: VariantRule) -> Result<(), CommitError> {
        self.rules.value_mut().push(rule);
        match self.rules.commit(&mut self.client) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.rules.value_mut().pop();
                self.notice(
                    NoticeLevel::Error,
                    format!("Failed to save new variant rule ({err})"),
                );
                Err(err)
            }
        }
    }

    fn notice(&mut self, level: NoticeLevel, content: String) {
        self.notices.push(Notice {
            level,
            content,
            created: Utc::now(),
        });
    }
}
