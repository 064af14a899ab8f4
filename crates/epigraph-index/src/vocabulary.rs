//! Tag vocabulary: the ordered, append-only list of known tag names.
//!
//! New tag names pass a syntax gate before entering the vocabulary.
//! Registration is idempotent; nothing is ever removed within a session.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum accepted length of a tag name.
pub const TAG_NAME_MAX_LENGTH: usize = 50;

/// A tag name is `<category>.<name>`: a lowercase alphanumeric category
/// starting with a letter, a dot, then lowercase alphanumeric segments
/// separated by dots or dashes (`k.round`, `m.exemplar`).
static TAG_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*\.[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?$")
        .expect("tag-name pattern is valid")
});

/// Reasons a candidate tag name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagNameError {
    #[error("tag name is empty")]
    Empty,

    #[error("tag name exceeds {max} characters (got {actual})", max = TAG_NAME_MAX_LENGTH)]
    TooLong { actual: usize },

    #[error("tag name is not of the form category.name: {0}")]
    InvalidSyntax(String),

    #[error("tag name already exists: {0}")]
    Duplicate(String),
}

/// Ordered, append-only registry of known tag names.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry from an existing vocabulary, preserving first
    /// occurrence order and dropping duplicates.
    pub fn with_tags(tags: impl IntoIterator<Item = String>) -> Self {
        let mut registry = Self::new();
        for tag in tags {
            if !registry.contains(&tag) {
                registry.tags.push(tag);
            }
        }
        registry
    }

    /// Validate a candidate name against the syntax gate and the known
    /// vocabulary. `None` means the candidate is acceptable.
    pub fn name_error(&self, candidate: &str) -> Option<TagNameError> {
        if candidate.is_empty() {
            return Some(TagNameError::Empty);
        }
        if candidate.len() > TAG_NAME_MAX_LENGTH {
            return Some(TagNameError::TooLong {
                actual: candidate.len(),
            });
        }
        if !TAG_NAME_PATTERN.is_match(candidate) {
            return Some(TagNameError::InvalidSyntax(candidate.to_string()));
        }
        if self.contains(candidate) {
            return Some(TagNameError::Duplicate(candidate.to_string()));
        }
        None
    }

    /// Register a tag name. Returns `true` when the name was newly added.
    ///
    /// Idempotent: an already-known name leaves the registry unchanged.
    /// A syntactically invalid name is refused and leaves it unchanged.
    pub fn register(&mut self, name: &str) -> bool {
        if self.name_error(name).is_some() {
            return false;
        }
        self.tags.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag == name)
    }

    /// Known tag names, in registration order.
    pub fn known(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
