use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

/// Key-value persistence used by the session and progress stores.
///
/// Implementations never surface I/O failures: a failed read behaves like an
/// absent key and a failed write is dropped.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage for tests and contexts without a writable disk
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

/// Disk-backed storage keeping one file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store files under the given directory, creating it best-effort
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Store files under the per-user data directory, falling back to the
    /// working directory when none is available
    pub fn open_default() -> Self {
        let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.push("vitrine");
        Self::new(dir)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Keys like "vitrine:progress" must become portable file names
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = fs::write(self.key_path(key), value) {
            debug!("Failed to persist '{}': {}", key, err);
        }
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("token"), None);

        storage.set("token", "abc");
        assert_eq!(storage.get("token"), Some("abc".to_string()));

        storage.set("token", "def");
        assert_eq!(storage.get("token"), Some("def".to_string()));

        storage.remove("token");
        assert_eq!(storage.get("token"), None);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove("never-set");
        assert_eq!(storage.get("never-set"), None);
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = std::env::temp_dir().join(format!("vitrine-storage-{}", std::process::id()));
        let storage = FileStorage::new(&dir);

        storage.set("vitrine:progress", "{}");
        assert_eq!(storage.get("vitrine:progress"), Some("{}".to_string()));

        storage.remove("vitrine:progress");
        assert_eq!(storage.get("vitrine:progress"), None);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_storage_sanitizes_keys() {
        let dir = std::env::temp_dir().join(format!("vitrine-sanitize-{}", std::process::id()));
        let storage = FileStorage::new(&dir);

        let path = storage.key_path("vitrine:progress");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, "vitrine_progress.json");

        fs::remove_dir_all(&dir).ok();
    }
}
