//! Key-Value Storage
//!
//! The persistence collaborator behind the session store. The contract is a
//! string-keyed store with infallible signatures: read and write failures are
//! logged and swallowed, so a corrupt or unwritable store degrades to
//! "no session" instead of crashing the client.
//!
//! Two implementations ship with the crate:
//!
//! - [`FileStorage`] - a JSON file under the platform data directory, the
//!   durable store a desktop client uses
//! - [`MemoryStorage`] - a process-local map, used by tests and by callers
//!   that do not want persistence

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// String-keyed storage capability.
///
/// Implementations must be safe to share across threads; the session store
/// and the gateway hold the same instance.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Write `value` under `key`, overwriting any prior value
    fn set(&self, key: &str, value: &str);
    /// Remove `key`; removing an absent key is a no-op
    fn remove(&self, key: &str);
}

/// In-memory storage, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!(key, error = %e, "storage lock poisoned on read");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// File-backed storage: a single JSON object on disk, loaded once at
/// construction and rewritten after every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the default store under the platform data directory
    /// (for example `~/.local/share/dashgate/storage.json`).
    pub fn new() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| {
            warn!("no platform data directory, falling back to the temp directory");
            std::env::temp_dir()
        });
        Self::at_path(base.join("dashgate").join("storage.json"))
    }

    /// Open a store at an explicit path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn read_entries(path: &Path) -> HashMap<String, String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            // A missing file is the normal first-run case
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read storage file");
                return HashMap::new();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt storage file, starting empty");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "failed to create storage directory");
                return;
            }
        }
        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize storage");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "failed to write storage file");
        }
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!(key, error = %e, "storage lock poisoned on read");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
            self.persist(&entries);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(key).is_some() {
                self.persist(&entries);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("token"), None);
        storage.set("token", "abc");
        assert_eq!(storage.get("token"), Some("abc".to_string()));
        storage.remove("token");
        assert_eq!(storage.get("token"), None);
    }

    #[test]
    fn test_memory_overwrite() {
        let storage = MemoryStorage::new();
        storage.set("token", "first");
        storage.set("token", "second");
        assert_eq!(storage.get("token"), Some("second".to_string()));
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove("missing");
        assert_eq!(storage.get("missing"), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::at_path(&path);
        storage.set("token", "abc");
        storage.set("login_timestamp", "12345");
        drop(storage);

        let reopened = FileStorage::at_path(&path);
        assert_eq!(reopened.get("token"), Some("abc".to_string()));
        assert_eq!(reopened.get("login_timestamp"), Some("12345".to_string()));
    }

    #[test]
    fn test_file_storage_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = FileStorage::at_path(&path);
        assert_eq!(storage.get("token"), None);
        // still usable for writes
        storage.set("token", "abc");
        assert_eq!(storage.get("token"), Some("abc".to_string()));
    }

    #[test]
    fn test_file_storage_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::at_path(dir.path().join("nested").join("storage.json"));
        assert_eq!(storage.get("token"), None);
        storage.set("token", "abc");

        let reopened = FileStorage::at_path(dir.path().join("nested").join("storage.json"));
        assert_eq!(reopened.get("token"), Some("abc".to_string()));
    }
}
