//! Progress persistence port
//!
//! One number per key, last write wins, single writer. Keys derive from the
//! configured title:
//!
//! | Key | Holds |
//! |-----|-------|
//! | `goal_{hash}_current` | current progress |
//! | `goal_{hash}_target` | target, only once changed at runtime |

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Asynchronous key→number store
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Value under `key`, `None` if never written
    async fn get(&self, key: &str) -> Result<Option<f64>, StoreError>;

    /// Overwrite `key`
    async fn set(&self, key: &str, value: f64) -> Result<(), StoreError>;
}

/// Pair of keys one goal session persists under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub current: String,
    pub target: String,
}

impl StoreKeys {
    /// Derive keys from a stable identifier (the configured title)
    pub fn for_title(title: &str) -> Self {
        let base = key_base(title);
        Self {
            current: format!("{}_current", base),
            target: format!("{}_target", base),
        }
    }
}

/// `goal_` + first 8 bytes of SHA-256(title) as hex
fn key_base(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.trim().as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    let hex: String = digest[0..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("goal_{}", hex)
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a value already present
    pub fn with_value(key: impl Into<String>, value: f64) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value);
        Self {
            values: RwLock::new(values),
        }
    }

    /// Number of keys written
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<f64>, StoreError> {
        Ok(self.values.read().await.get(key).copied())
    }

    async fn set(&self, key: &str, value: f64) -> Result<(), StoreError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

// =============================================================================
// File store
// =============================================================================

/// On-disk record, one file per key
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    key: String,
    value: f64,
    updated_at: DateTime<Utc>,
}

/// Suffix for temp files, unique per write within the process
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Each key is a JSON file: `<dir>/<key>.json`. Writes land in a temp file
/// renamed over the old one, so readers never see a partial file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store backed by `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_file(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl ProgressStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<f64>, StoreError> {
        let path = self.key_file(key);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let stored: StoredValue = serde_json::from_str(&json)?;
        if !stored.value.is_finite() {
            return Err(StoreError::Corrupt {
                key: key.to_string(),
            });
        }
        Ok(Some(stored.value))
    }

    async fn set(&self, key: &str, value: f64) -> Result<(), StoreError> {
        let path = self.key_file(key);
        let stored = StoredValue {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        let temp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(source) = tokio::fs::write(&temp, json).await {
            return Err(StoreError::Io {
                path: temp.display().to_string(),
                source,
            });
        }
        if let Err(source) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            });
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_keys_are_deterministic() {
        let a = StoreKeys::for_title("SUBSCRIPTIONS");
        let b = StoreKeys::for_title("SUBSCRIPTIONS");
        assert_eq!(a, b);
        assert!(a.current.starts_with("goal_"));
        assert!(a.current.ends_with("_current"));
        assert!(a.target.ends_with("_target"));
        // goal_ + 16 hex chars + _current
        assert_eq!(a.current.len(), 5 + 16 + 8);
    }

    #[test]
    fn test_keys_differ_per_title() {
        assert_ne!(
            StoreKeys::for_title("followers"),
            StoreKeys::for_title("donations")
        );
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", 12.5).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(12.5));
        store.set("k", 3.0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(3.0));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("progress")).unwrap();

        assert_eq!(store.get("goal_x_current").await.unwrap(), None);
        store.set("goal_x_current", 42.0).await.unwrap();
        assert_eq!(store.get("goal_x_current").await.unwrap(), Some(42.0));

        // A second handle on the same directory sees the value
        let reopened = FileStore::new(store.dir()).unwrap();
        assert_eq!(reopened.get("goal_x_current").await.unwrap(), Some(42.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_file_store_concurrent_sets_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());
        let values = [123456789.125, 1.0, 987654321.5, 2.0];

        for _ in 0..25 {
            let writers: Vec<_> = values
                .iter()
                .map(|&value| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move { store.set("goal_x_current", value).await })
                })
                .collect();
            for writer in writers {
                writer.await.unwrap().unwrap();
            }

            let read = store.get("goal_x_current").await.unwrap().unwrap();
            assert!(values.contains(&read));
        }

        // Only the key file is left behind
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();
        assert!(matches!(
            store.get("broken").await,
            Err(StoreError::Serialization(_))
        ));
    }
}
