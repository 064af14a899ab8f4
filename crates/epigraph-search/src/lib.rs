//! # epigraph-search
//!
//! Faceted search over the effective annotation index.
//!
//! The engine is a pure function of its inputs: the reconciled index, the
//! current search state, and the facet configuration. It performs no I/O
//! and keeps no state; callers own caching and persistence of settings.

pub mod engine;
pub mod facet;
pub mod query;

pub use engine::{Bucket, Pagination, SearchResult, search};
pub use facet::{
    FacetKey, FacetSettings, FacetSort, OPTIONS_PER_FACET, OPTIONS_PER_FACET_EXPANDED,
    SearchConfig, SortOrder, UnknownFacetError,
};
pub use query::{ITEMS_PER_PAGE, SearchState};
