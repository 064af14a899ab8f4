//! CAS-guarded resource stores.
//!
//! `VersionedResource` is the single canonical compare-and-swap path for
//! everything this core persists. It is the sole owner of its resource's
//! version token: the token changes only on a confirmed read or write.

use crate::client::{StoreClientError, VersionToken, VersionedStore};
use crate::queue::ChangeQueue;
use crate::record::ChangeRecord;
use crate::rules::VariantRule;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Default store path of the persisted change queue.
pub const CHANGE_QUEUE_PATH: &str = "annotations/change-queue.json";

/// Default store path of the variant-rule list.
pub const VARIANT_RULES_PATH: &str = "app/data/variant-rules.json";

/// Errors raised while loading a persisted resource.
///
/// A load failure always leaves the resource in its fallback state: the
/// default value plus the unread token, so no later write can target an
/// unconfirmed base.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreClientError),

    #[error("malformed resource {path}: {message}")]
    Parse { path: String, message: String },
}

/// Errors raised while committing a persisted resource.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The CAS precondition failed: someone else wrote the resource since
    /// our last confirmed read. The in-memory value and token are left
    /// unchanged; the caller must re-load, re-apply its pending edit, and
    /// retry explicitly. Never retried automatically: the fresh copy may
    /// already resolve the same item/tag pair differently.
    #[error("conflicting write detected for {path}: reload and retry")]
    Conflict { path: String },

    /// The resource was never confirmed from the store in this session.
    #[error("refusing to write {path}: resource was never read")]
    Unconfirmed { path: String },

    #[error("failed to encode {path}: {message}")]
    Encode { path: String, message: String },

    #[error(transparent)]
    Store(StoreClientError),
}

/// One persisted JSON resource plus its CAS state.
#[derive(Debug, Clone)]
pub struct VersionedResource<T> {
    path: String,
    value: T,
    token: VersionToken,
}

impl<T> VersionedResource<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: T::default(),
            token: VersionToken::Unread,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn token(&self) -> &VersionToken {
        &self.token
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Fetch the persisted copy and its token.
    ///
    /// On any failure the resource degrades to the fallback state and the
    /// error is returned for the caller to surface; the session stays
    /// usable read-only.
    pub fn load(&mut self, client: &impl VersionedStore) -> Result<(), LoadError> {
        let read = match client.read_json(&self.path) {
            Ok(read) => read,
            Err(err) => {
                tracing::warn!(path = %self.path, error = %err, "resource load failed; using fallback");
                self.value = T::default();
                self.token = VersionToken::Unread;
                return Err(LoadError::Store(err));
            }
        };

        match serde_json::from_value(read.value) {
            Ok(value) => {
                self.value = value;
                self.token = VersionToken::Known(read.token);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %self.path, error = %err, "resource parse failed; using fallback");
                self.value = T::default();
                self.token = VersionToken::Unread;
                Err(LoadError::Parse {
                    path: self.path.clone(),
                    message: err.to_string(),
                })
            }
        }
    }

    /// Persist the in-memory value with a compare-and-swap write.
    ///
    /// On success the local token advances to the store's new token. On
    /// conflict or transport failure the in-memory value and old token
    /// are left untouched.
    pub fn commit(
        &mut self,
        client: &mut impl VersionedStore,
    ) -> Result<&VersionToken, CommitError> {
        if self.token.is_unread() {
            return Err(CommitError::Unconfirmed {
                path: self.path.clone(),
            });
        }

        let value = serde_json::to_value(&self.value).map_err(|e| CommitError::Encode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        match client.write_json(&self.path, &value, &self.token) {
            Ok(new_token) => {
                self.token = VersionToken::Known(new_token);
                Ok(&self.token)
            }
            Err(StoreClientError::VersionMismatch { .. }) => {
                tracing::debug!(path = %self.path, "commit lost the version race");
                Err(CommitError::Conflict {
                    path: self.path.clone(),
                })
            }
            Err(err) => Err(CommitError::Store(err)),
        }
    }
}

/// The persisted change queue and its CAS state.
#[derive(Debug, Clone)]
pub struct ChangeQueueStore {
    resource: VersionedResource<ChangeQueue>,
}

impl ChangeQueueStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            resource: VersionedResource::new(path),
        }
    }

    pub fn path(&self) -> &str {
        self.resource.path()
    }

    pub fn token(&self) -> &VersionToken {
        self.resource.token()
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.resource.value().changes
    }

    pub fn len(&self) -> usize {
        self.resource.value().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource.value().is_empty()
    }

    /// Fetch the persisted queue; see [`VersionedResource::load`].
    pub fn load(&mut self, client: &impl VersionedStore) -> Result<(), LoadError> {
        self.resource.load(client)
    }

    /// Add a record to the in-memory queue. Does not persist.
    pub fn append(&mut self, record: ChangeRecord) {
        self.resource.value_mut().append(record);
    }

    /// Persist the full in-memory queue; see [`VersionedResource::commit`].
    pub fn commit(
        &mut self,
        client: &mut impl VersionedStore,
    ) -> Result<&VersionToken, CommitError> {
        self.resource.commit(client)
    }
}

/// The persisted variant-rule list, under the same CAS discipline.
pub type VariantRuleStore = VersionedResource<Vec<VariantRule>>;
