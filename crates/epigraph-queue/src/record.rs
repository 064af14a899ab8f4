//! Change record: one persisted batch of signed tag edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix marking a tag token as a removal.
pub const REMOVAL_MARKER: char = '-';

/// Reference to one annotation touched by a change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRef {
    pub id: String,
    /// Stable per-image annotation file reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
}

fn default_timestamp() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// One persisted edit batch. Immutable once created: records are appended
/// to the queue and never rewritten.
///
/// `tags` holds signed tokens: a bare name means "add", a leading `-`
/// means "remove the remainder as a tag name".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(default)]
    pub annotations: Vec<AnnotationRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator: String,
    #[serde(default = "default_timestamp")]
    pub created: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(
        annotations: Vec<AnnotationRef>,
        tags: Vec<String>,
        creator: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            annotations,
            tags,
            creator: creator.into(),
            created,
        }
    }

    /// Iterate the record's tag tokens as signed operations, in order.
    pub fn tag_ops(&self) -> impl Iterator<Item = TagOp<'_>> {
        self.tags.iter().map(|token| TagOp::parse(token))
    }
}

/// A signed tag token, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOp<'a> {
    Add(&'a str),
    Remove(&'a str),
}

impl<'a> TagOp<'a> {
    /// Decode one signed token.
    pub fn parse(token: &'a str) -> Self {
        match token.strip_prefix(REMOVAL_MARKER) {
            Some(name) => TagOp::Remove(name),
            None => TagOp::Add(token),
        }
    }

    /// The bare tag name this operation refers to.
    pub fn name(&self) -> &'a str {
        match self {
            TagOp::Add(name) | TagOp::Remove(name) => name,
        }
    }
}
