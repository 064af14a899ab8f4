//! The staged bulk edit: selected items plus tri-state tag intents.

use chrono::{DateTime, Utc};
use epigraph_queue::{AnnotationRef, ChangeRecord, REMOVAL_MARKER};
use std::collections::BTreeSet;

/// Per-tag staged intent.
///
/// One fixed cycle, advanced by [`EditStaging::cycle_tag`]:
/// `Unset → Add → Remove → Unset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagEditState {
    #[default]
    Unset,
    Add,
    Remove,
}

impl TagEditState {
    /// The next state in the cycle.
    pub fn cycled(self) -> Self {
        match self {
            TagEditState::Unset => TagEditState::Add,
            TagEditState::Add => TagEditState::Remove,
            TagEditState::Remove => TagEditState::Unset,
        }
    }
}

/// Raised when a record is requested from an empty staged edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StagingError {
    #[error("nothing to save: select at least one item and one tag change")]
    NothingToSave,
}

/// The in-progress bulk edit.
///
/// Tag entries keep the order of their first toggle so a built record's
/// token list is stable across cycles.
#[derive(Debug, Clone, Default)]
pub struct EditStaging {
    selection: BTreeSet<String>,
    tag_states: Vec<(String, TagEditState)>,
}

impl EditStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one item in or out of the selection. Returns whether the
    /// item is selected afterwards.
    pub fn toggle_item(&mut self, id: &str) -> bool {
        if self.selection.remove(id) {
            false
        } else {
            self.selection.insert(id.to_string());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    /// Advance one tag's intent through the cycle. Returns the new state.
    pub fn cycle_tag(&mut self, name: &str) -> TagEditState {
        if let Some((_, state)) = self.tag_states.iter_mut().find(|(tag, _)| tag == name) {
            *state = state.cycled();
            return *state;
        }
        let state = TagEditState::Unset.cycled();
        self.tag_states.push((name.to_string(), state));
        state
    }

    pub fn tag_state(&self, name: &str) -> TagEditState {
        self.tag_states
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, state)| *state)
            .unwrap_or_default()
    }

    /// Staged tag intents that are not `Unset`, in first-toggle order.
    pub fn staged_tags(&self) -> impl Iterator<Item = (&str, TagEditState)> {
        self.tag_states
            .iter()
            .filter(|(_, state)| *state != TagEditState::Unset)
            .map(|(tag, state)| (tag.as_str(), *state))
    }

    /// Whether a save would do anything: non-empty selection and at least
    /// one tag not `Unset`.
    pub fn is_dirty(&self) -> bool {
        !self.selection.is_empty() && self.staged_tags().next().is_some()
    }

    /// Turn the staged edit into a change record.
    ///
    /// `resolver` derives the stable file reference for each selected
    /// item id. Unless the edit is dirty, fails with
    /// [`StagingError::NothingToSave`] and performs no side effect.
    pub fn build_record<F>(
        &self,
        creator: impl Into<String>,
        resolver: F,
        now: DateTime<Utc>,
    ) -> Result<ChangeRecord, StagingError>
    where
        F: Fn(&str) -> String,
    {
        if !self.is_dirty() {
            return Err(StagingError::NothingToSave);
        }

        let annotations = self
            .selection
            .iter()
            .map(|id| AnnotationRef {
                id: id.clone(),
                file: resolver(id),
            })
            .collect();
        let tags = self
            .staged_tags()
            .map(|(tag, state)| match state {
                TagEditState::Add => tag.to_string(),
                TagEditState::Remove => format!("{REMOVAL_MARKER}{tag}"),
                TagEditState::Unset => unreachable!("staged_tags filters Unset"),
            })
            .collect();

        Ok(ChangeRecord::new(annotations, tags, creator, now))
    }

    /// Reset after a successful save: empty selection, every tag `Unset`.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.tag_states.clear();
    }
}
