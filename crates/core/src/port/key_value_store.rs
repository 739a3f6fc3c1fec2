// Key-Value Store Port
// Read-only capability: fetch every entry under a path, recursively

use crate::domain::RawEntry;
use async_trait::async_trait;
use thiserror::Error;

/// Store fetch errors
///
/// Retrying is the adapter's job; callers treat any of these as final.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unreachable after {attempts} attempts: {reason}")]
    Unavailable { attempts: u32, reason: String },

    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

/// Store read contract consumed by the resolver
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch all entries at or below `path`
    ///
    /// Directories are returned with `is_directory = true`. A path that
    /// does not exist yields an empty list, not an error.
    ///
    /// # Errors
    /// - StoreError::Unavailable once the adapter's retry policy is exhausted
    /// - StoreError::InvalidResponse if the store replied with something unparseable
    async fn fetch_recursive(&self, path: &str) -> Result<Vec<RawEntry>, StoreError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Arc, Mutex};

    /// In-memory store keyed by absolute path
    ///
    /// Synthesizes directory entries for every intermediate path, the way
    /// a hierarchical store reports them.
    #[derive(Clone, Default)]
    pub struct InMemoryStore {
        entries: Arc<Mutex<BTreeMap<String, String>>>,
        fetched: Arc<Mutex<Vec<String>>>,
        fail_under: Arc<Mutex<Option<String>>>,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(self, path: impl Into<String>, value: impl Into<String>) -> Self {
            self.set(path, value);
            self
        }

        pub fn set(&self, path: impl Into<String>, value: impl Into<String>) {
            self.entries
                .lock()
                .unwrap()
                .insert(path.into(), value.into());
        }

        /// Make every fetch at or below `prefix` fail as unreachable
        pub fn fail_under(&self, prefix: impl Into<String>) {
            *self.fail_under.lock().unwrap() = Some(prefix.into());
        }

        pub fn fetch_count(&self) -> usize {
            self.fetched.lock().unwrap().len()
        }

        /// Paths requested so far, in call order
        pub fn fetched_paths(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    fn is_at_or_below(path: &str, root: &str) -> bool {
        path == root
            || path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    #[async_trait]
    impl KeyValueStore for InMemoryStore {
        async fn fetch_recursive(&self, path: &str) -> Result<Vec<RawEntry>, StoreError> {
            self.fetched.lock().unwrap().push(path.to_string());

            if let Some(prefix) = self.fail_under.lock().unwrap().as_deref() {
                if is_at_or_below(path, prefix) {
                    return Err(StoreError::Unavailable {
                        attempts: 1,
                        reason: format!("injected failure under {prefix}"),
                    });
                }
            }

            let entries = self.entries.lock().unwrap();
            let mut directories = BTreeSet::new();
            let mut out = Vec::new();

            for (key, value) in entries.iter().filter(|(k, _)| is_at_or_below(k, path)) {
                let mut parent = key.as_str();
                while let Some(idx) = parent.rfind('/') {
                    parent = &parent[..idx];
                    if parent.len() <= path.len() {
                        break;
                    }
                    directories.insert(parent.to_string());
                }
                out.push(RawEntry::value(key.clone(), value.clone()));
            }

            out.extend(directories.into_iter().map(RawEntry::directory));
            Ok(out)
        }
    }
}
