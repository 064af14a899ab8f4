//! Versioned store client: the seam to the shared file store.
//!
//! Every resource read returns a version token alongside its content;
//! every write carries the caller's last-known token as a precondition
//! and fails without touching the store when the tokens no longer match.
//!
//! Two adapters are provided: `LocalStore` (a filesystem tree, used by the
//! offline tooling) and `InMemoryStore` (used by tests and examples). The
//! remote client that talks to the hosted store implements the same trait
//! outside this repo.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Version token of a stored resource.
///
/// `Unread` is the sentinel state before the first confirmed read; no
/// write may ever be attempted against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    Unread,
    Known(String),
}

impl VersionToken {
    pub fn known(token: impl Into<String>) -> Self {
        Self::Known(token.into())
    }

    pub fn is_unread(&self) -> bool {
        matches!(self, Self::Unread)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unread => write!(f, "<unread>"),
            Self::Known(token) => write!(f, "{token}"),
        }
    }
}

/// Errors surfaced by a store client.
#[derive(Debug, thiserror::Error)]
pub enum StoreClientError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("version precondition failed for {path}: expected {expected}, found {found}")]
    VersionMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("resource {path} is not valid JSON: {message}")]
    Malformed { path: String, message: String },

    #[error("write to {0} requires authentication")]
    Unauthenticated(String),

    #[error("transport failure for {path}: {message}")]
    Transport { path: String, message: String },
}

/// A successfully read resource: decoded content plus its version token.
#[derive(Debug, Clone)]
pub struct VersionedRead {
    pub value: Value,
    pub token: String,
}

/// Read/write access to named JSON resources with version tokens.
pub trait VersionedStore {
    fn read_json(&self, path: &str) -> Result<VersionedRead, StoreClientError>;

    /// Compare-and-swap write: succeeds only when the resource's current
    /// token equals `expected` (`Unread` expects the resource to be
    /// absent). Returns the new token. On mismatch the store is left
    /// untouched.
    fn write_json(
        &mut self,
        path: &str,
        value: &Value,
        expected: &VersionToken,
    ) -> Result<String, StoreClientError>;

    fn is_authenticated(&self) -> bool;

    fn user_id(&self) -> String;
}

/// Content digest used as the version token by the local adapters.
///
/// The analogue of the remote store's blob identifiers: two byte-equal
/// resources always carry equal tokens.
fn content_token(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}

/// Filesystem-backed store: resources are files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    user: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            user: user.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, StoreClientError> {
        let target = self.resolve(path);
        fs::read(&target).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreClientError::NotFound(path.to_string())
            } else {
                StoreClientError::Transport {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

impl VersionedStore for LocalStore {
    fn read_json(&self, path: &str) -> Result<VersionedRead, StoreClientError> {
        let bytes = self.read_bytes(path)?;
        let token = content_token(&bytes);
        let value =
            serde_json::from_slice(&bytes).map_err(|e| StoreClientError::Malformed {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(VersionedRead { value, token })
    }

    fn write_json(
        &mut self,
        path: &str,
        value: &Value,
        expected: &VersionToken,
    ) -> Result<String, StoreClientError> {
        let current = match self.read_bytes(path) {
            Ok(bytes) => Some(content_token(&bytes)),
            Err(StoreClientError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };

        let matches = match (expected, current.as_deref()) {
            (VersionToken::Unread, None) => true,
            (VersionToken::Known(token), Some(found)) => token == found,
            _ => false,
        };
        if !matches {
            return Err(StoreClientError::VersionMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                found: current.unwrap_or_else(|| "<missing>".to_string()),
            });
        }

        let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| {
            StoreClientError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;
        bytes.push(b'\n');
        write_atomic(&self.resolve(path), &bytes).map_err(|message| {
            StoreClientError::Transport {
                path: path.to_string(),
                message,
            }
        })?;
        Ok(content_token(&bytes))
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    fn user_id(&self) -> String {
        self.user.clone()
    }
}

/// Replace `path` atomically: write to a sibling temp file, rename over.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }

    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}", std::process::id()));
    let tmp = PathBuf::from(tmp);

    let write_result = (|| -> Result<(), String> {
        let mut file = File::create(&tmp).map_err(|e| format!("{}: {e}", tmp.display()))?;
        file.write_all(bytes)
            .map_err(|e| format!("{}: {e}", tmp.display()))?;
        file.sync_all()
            .map_err(|e| format!("{}: {e}", tmp.display()))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp);
        return Err(error);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        format!("{} -> {}: {e}", tmp.display(), path.display())
    })
}

/// In-memory store: deterministic tokens, no I/O.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    resources: BTreeMap<String, (Value, String)>,
    user: String,
    authenticated: bool,
    offline: bool,
}

impl InMemoryStore {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            resources: BTreeMap::new(),
            user: user.into(),
            authenticated: true,
            offline: false,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Insert a resource directly, bypassing the CAS precondition.
    pub fn seed(&mut self, path: impl Into<String>, value: Value) {
        let token = value_token(&value);
        self.resources.insert(path.into(), (value, token));
    }

    /// Simulate a transport outage: every read and write fails.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Inspect the persisted content of a resource.
    pub fn persisted(&self, path: &str) -> Option<&Value> {
        self.resources.get(path).map(|(value, _)| value)
    }

    fn check_online(&self, path: &str) -> Result<(), StoreClientError> {
        if self.offline {
            return Err(StoreClientError::Transport {
                path: path.to_string(),
                message: "store is offline".to_string(),
            });
        }
        Ok(())
    }
}

fn value_token(value: &Value) -> String {
    content_token(value.to_string().as_bytes())
}

impl VersionedStore for InMemoryStore {
    fn read_json(&self, path: &str) -> Result<VersionedRead, StoreClientError> {
        self.check_online(path)?;
        let (value, token) = self
            .resources
            .get(path)
            .ok_or_else(|| StoreClientError::NotFound(path.to_string()))?;
        Ok(VersionedRead {
            value: value.clone(),
            token: token.clone(),
        })
    }

    fn write_json(
        &mut self,
        path: &str,
        value: &Value,
        expected: &VersionToken,
    ) -> Result<String, StoreClientError> {
        self.check_online(path)?;
        if !self.authenticated {
            return Err(StoreClientError::Unauthenticated(path.to_string()));
        }

        let current = self.resources.get(path).map(|(_, token)| token.as_str());
        let matches = match (expected, current) {
            (VersionToken::Unread, None) => true,
            (VersionToken::Known(token), Some(found)) => token == found,
            _ => false,
        };
        if !matches {
            return Err(StoreClientError::VersionMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                found: current.unwrap_or("<missing>").to_string(),
            });
        }

        let token = value_token(value);
        self.resources
            .insert(path.to_string(), (value.clone(), token.clone()));
        Ok(token)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn user_id(&self) -> String {
        self.user.clone()
    }
}
