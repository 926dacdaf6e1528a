//! Persisted key/value state, the terminal counterpart of browser local storage.
//!
//! Values are kept as a single JSON object on disk. Reads never fail: a missing
//! or corrupted file, or an entry that no longer matches the expected type,
//! yields the caller's default and a warning in the log.

mod cell;

pub use cell::PersistedCell;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;

/// JSON-file backed key/value store
#[derive(Debug)]
pub struct LocalStore {
    /// None for a purely in-memory store
    path: Option<PathBuf>,
    entries: Mutex<Map<String, Value>>,
}

impl LocalStore {
    /// Open the store at `path`, starting empty if the file is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Map::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Parsed value for `key`, or `default` if absent or unparseable
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.entries.lock().get(key).cloned() else {
            return default;
        };

        match serde_json::from_value(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored value for '{}': {}", key, e);
                default
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Store `value` under `key`.
    ///
    /// The in-memory entry is updated before the file is written, so it stays
    /// authoritative for this process even when the write fails.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let snapshot = {
            let mut entries = self.entries.lock();
            entries.insert(key.to_string(), value);
            entries.clone()
        };
        self.persist(&snapshot)
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let (removed, snapshot) = {
            let mut entries = self.entries.lock();
            let removed = entries.remove(key).is_some();
            (removed, entries.clone())
        };
        if removed {
            self.persist(&snapshot)?;
        }
        Ok(removed)
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let content = serde_json::to_string_pretty(entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("{} is not a JSON object, starting empty", path.display());
            Map::new()
        }
        Err(e) => {
            tracing::warn!("{} is corrupted, starting empty: {}", path.display(), e);
            Map::new()
        }
    }
}

/// Storage key under which an endpoint's filters are persisted
pub fn filters_key(endpoint: &str) -> String {
    format!("filters{}", endpoint.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_returns_default() {
        let store = LocalStore::in_memory();
        assert_eq!(store.get("nope", 42u32), 42);
        assert!(!store.contains("nope"));
    }

    #[test]
    fn test_set_then_get() {
        let store = LocalStore::in_memory();
        store.set("columns", &vec!["id", "name"]).unwrap();
        let columns: Vec<String> = store.get("columns", vec![]);
        assert_eq!(columns, vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_type_mismatch_returns_default() {
        let store = LocalStore::in_memory();
        store.set("page", &"not a number").unwrap();
        assert_eq!(store.get("page", 3u32), 3);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("storage.json");

        let store = LocalStore::open(&path);
        let mut filters = BTreeMap::new();
        filters.insert("status".to_string(), "ACTIVE".to_string());
        store.set("filters_api_bots", &filters).unwrap();
        drop(store);

        let reopened = LocalStore::open(&path);
        let loaded: BTreeMap<String, String> = reopened.get("filters_api_bots", BTreeMap::new());
        assert_eq!(loaded, filters);
    }

    #[test]
    fn test_corrupted_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = LocalStore::open(&path);
        assert!(store.keys().is_empty());
        assert_eq!(store.get("anything", 1u8), 1);

        store.set("fresh", &true).unwrap();
        let reopened = LocalStore::open(&path);
        assert!(reopened.get("fresh", false));
    }

    #[test]
    fn test_remove() {
        let store = LocalStore::in_memory();
        store.set("a", &1).unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
    }

    #[test]
    fn test_filters_key() {
        assert_eq!(filters_key("/api/bots"), "filters_api_bots");
        assert_eq!(filters_key("/api/blog/posts"), "filters_api_blog_posts");
    }
}
