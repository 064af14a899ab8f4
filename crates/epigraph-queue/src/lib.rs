//! # epigraph-queue
//!
//! Change-queue layer for the annotation review core.
//!
//! This crate provides:
//! - `ChangeRecord` and `ChangeQueue` (the persisted edit batches)
//! - the reconciliation engine (`replay_queue` / `apply_record`)
//! - the versioned store client seam (`VersionedStore`) with local
//!   filesystem and in-memory adapters
//! - CAS-guarded resource stores (`ChangeQueueStore`, `VariantRuleStore`)
//!
//! It intentionally does not answer queries or render anything. Query
//! concerns live in `epigraph-search`; edit staging in `epigraph-edit`.
//!
//! ## Data flow
//!
//! ```text
//! store client ──▶ ChangeQueueStore ──▶ replay_queue ──▶ effective index
//!                        ▲                                     │
//!                        └──── append + CAS commit ◀───────────┘
//! ```

pub mod client;
pub mod queue;
pub mod reconcile;
pub mod record;
pub mod rules;
pub mod store;

pub use client::{
    InMemoryStore, LocalStore, StoreClientError, VersionToken, VersionedRead, VersionedStore,
};
pub use queue::ChangeQueue;
pub use reconcile::{apply_record, replay_queue};
pub use record::{AnnotationRef, ChangeRecord, REMOVAL_MARKER, TagOp};
pub use rules::{ComponentFeature, VariantRule};
pub use store::{
    CHANGE_QUEUE_PATH, ChangeQueueStore, CommitError, LoadError, VARIANT_RULES_PATH,
    VariantRuleStore, VersionedResource,
};
