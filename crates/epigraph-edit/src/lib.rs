//! # epigraph-edit
//!
//! Edit staging and session orchestration for the annotation review core.
//!
//! This crate provides:
//! - `EditStaging`: the in-progress bulk edit, a selection of items plus
//!   one tri-state edit per tag name
//! - `ReviewSession`: one user session over the effective dataset,
//!   wiring the store client, change queue, reconciliation, and staging
//!   into the load/save flows
//!
//! Staging is pure state; all I/O happens in the session.

pub mod session;
pub mod staging;

pub use session::{CommitEditError, Notice, NoticeLevel, ReviewSession};
pub use staging::{EditStaging, StagingError, TagEditState};
