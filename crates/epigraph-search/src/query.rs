//! Search state: the caller's current query, filters, and page.

use crate::facet::FacetKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default page size.
pub const ITEMS_PER_PAGE: usize = 24;

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    ITEMS_PER_PAGE
}

/// One query against the effective dataset.
///
/// Session-scoped; an external layer may mirror it into shareable query
/// parameters, but nothing here persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    /// Free-text phrase, matched token-wise over the searchable fields.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query: String,

    /// Selected options per facet. AND across keys, OR within one key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<FacetKey, Vec<String>>,

    /// 1-based page number. Out-of-range values clamp, never error.
    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            filters: BTreeMap::new(),
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one facet option: select when unselected, unselect when
    /// selected, dropping the key once its last option goes.
    pub fn toggle_option(&mut self, key: FacetKey, option: &str) {
        let selected = self.filters.entry(key).or_default();
        match selected.iter().position(|o| o == option) {
            Some(at) => {
                selected.remove(at);
                if selected.is_empty() {
                    self.filters.remove(&key);
                }
            }
            None => selected.push(option.to_string()),
        }
    }

    /// Drop the query text and every facet filter, keeping page size.
    pub fn reset(&mut self) {
        self.query.clear();
        self.filters.clear();
        self.page = default_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_option_selects_and_unselects() {
        let mut state = SearchState::new();
        state.toggle_option(FacetKey::Tags, "k.round");
        assert_eq!(
            state.filters.get(&FacetKey::Tags).map(Vec::as_slice),
            Some(["k.round".to_string()].as_slice())
        );

        state.toggle_option(FacetKey::Tags, "k.round");
        assert!(state.filters.is_empty());
    }

    #[test]
    fn reset_clears_query_and_filters() {
        let mut state = SearchState::new();
        state.query = "isic".to_string();
        state.page = 4;
        state.toggle_option(FacetKey::Script, "latin");

        state.reset();
        assert_eq!(state, SearchState::new());
    }

    #[test]
    fn state_parses_with_defaults() {
        let state: SearchState = serde_json::from_str("{}").expect("state must parse");
        assert_eq!(state.page, 1);
        assert_eq!(state.per_page, ITEMS_PER_PAGE);
    }
}
