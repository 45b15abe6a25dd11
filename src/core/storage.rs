//! Key-value storage for persisted collections
//!
//! The host platform offers a plain key-value service: `get` a list of keys and
//! receive an object, `set` an object and receive an acknowledgement. Themes live
//! under [`SAVED_THEMES_KEY`] and palettes under [`PALETTES_KEY`], each as a JSON
//! array. There is no schema versioning; a missing key reads as an empty array.
//!
//! Two backends are provided:
//! - [`JsonFileStore`] - a single pretty-printed JSON object on disk
//! - [`MemoryStore`] - in-process map, with optional write-failure injection

use crate::core::error::{Result, ThemeError};
use log::{debug, trace, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Storage key for the theme collection
pub const SAVED_THEMES_KEY: &str = "savedThemes";

/// Storage key for the palette collection
pub const PALETTES_KEY: &str = "palettes";

/// Storage key for the recently picked colors
pub const SELECTED_COLORS_KEY: &str = "selectedColors";

/// Host key-value storage service
pub trait KeyValueStore: Send + Sync {
    /// Fetch the given keys. Keys with no stored value are absent from the result.
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Store every entry of `items`, replacing previous values.
    fn set(&self, items: Map<String, Value>) -> Result<()>;
}

/// Read a JSON array stored under `key`, treating a missing key as empty.
pub fn read_collection<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>> {
    let mut values = store.get(&[key])?;
    match values.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| ThemeError::Parse(format!("Corrupt '{}' collection: {}", key, e))),
    }
}

/// Write `items` as a JSON array under `key`.
pub fn write_collection<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> Result<()> {
    let value = serde_json::to_value(items)?;
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    store.set(map)
}

/// Key-value store persisted as one JSON object file
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            trace!("Storage file {:?} does not exist yet", self.path);
            return Ok(Map::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| ThemeError::Storage(format!("Failed to open storage file: {}", e)))?;

        let reader = BufReader::new(file);
        let value: Value = serde_json::from_reader(reader)
            .map_err(|e| ThemeError::Parse(format!("Failed to parse storage file: {}", e)))?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ThemeError::Parse(
                "Storage file does not contain a JSON object".to_string(),
            )),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ThemeError::Storage("Storage lock poisoned".to_string()))?;

        let mut all = self.read_all()?;
        let mut result = Map::new();
        for key in keys {
            if let Some(value) = all.remove(*key) {
                result.insert((*key).to_string(), value);
            }
        }
        Ok(result)
    }

    fn set(&self, items: Map<String, Value>) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ThemeError::Storage("Storage lock poisoned".to_string()))?;

        // An unreadable file is left untouched so other keys are not lost.
        let mut all = self.read_all().map_err(|e| {
            warn!("Refusing to write unreadable storage file {:?}: {}", self.path, e);
            e
        })?;

        for (key, value) in items {
            all.insert(key, value);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ThemeError::Storage(format!("Failed to create storage directory: {}", e))
                })?;
            }
        }

        let file = File::create(&self.path)
            .map_err(|e| ThemeError::Storage(format!("Failed to create storage file: {}", e)))?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &Value::Object(all))
            .map_err(|e| ThemeError::Storage(format!("Failed to write storage file: {}", e)))?;

        debug!("Saved storage to: {}", self.path.display());
        Ok(())
    }
}

/// In-memory key-value store
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value under `key`, if any
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.lock().ok().and_then(|map| map.get(key).cloned())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let map = self
            .values
            .lock()
            .map_err(|_| ThemeError::Storage("Storage lock poisoned".to_string()))?;

        Ok(keys
            .iter()
            .filter_map(|key| map.get(*key).map(|v| ((*key).to_string(), v.clone())))
            .collect())
    }

    fn set(&self, items: Map<String, Value>) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ThemeError::Storage("Simulated write failure".to_string()));
        }

        let mut map = self
            .values
            .lock()
            .map_err(|_| ThemeError::Storage("Storage lock poisoned".to_string()))?;

        for (key, value) in items {
            map.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_reads_as_empty() {
        let store = MemoryStore::new();
        let items: Vec<String> = read_collection(&store, SAVED_THEMES_KEY).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        write_collection(&store, PALETTES_KEY, &["#ffffff".to_string()]).unwrap();
        let items: Vec<String> = read_collection(&store, PALETTES_KEY).unwrap();
        assert_eq!(items, vec!["#ffffff".to_string()]);
    }

    #[test]
    fn test_memory_store_write_failure() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let result = write_collection(&store, PALETTES_KEY, &[1, 2, 3]);
        assert!(matches!(result, Err(ThemeError::Storage(_))));
        assert!(store.raw(PALETTES_KEY).is_none());
    }

    #[test]
    fn test_json_file_store_keeps_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("nested").join("store.json"));

        write_collection(&store, SAVED_THEMES_KEY, &[json!({"name": "Ocean"})]).unwrap();
        write_collection(&store, PALETTES_KEY, &[json!({"id": "1"})]).unwrap();

        let themes: Vec<Value> = read_collection(&store, SAVED_THEMES_KEY).unwrap();
        let palettes: Vec<Value> = read_collection(&store, PALETTES_KEY).unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(palettes.len(), 1);
        assert!(store.path().exists());
    }

    #[test]
    fn test_json_file_store_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"{ invalid json content }").unwrap();

        let store = JsonFileStore::new(&path);
        let result: Result<Vec<Value>> = read_collection(&store, SAVED_THEMES_KEY);
        assert!(matches!(result, Err(ThemeError::Parse(_))));

    }

    #[test]
    fn test_json_file_store_write_keeps_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "{ invalid json content }").unwrap();

        let store = JsonFileStore::new(&path);
        let result = write_collection(&store, SAVED_THEMES_KEY, &[json!(1)]);
        assert!(matches!(result, Err(ThemeError::Parse(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ invalid json content }");
    }

    #[test]
    fn test_corrupt_collection_is_parse_error() {
        let store = MemoryStore::new();
        let mut map = Map::new();
        map.insert(SAVED_THEMES_KEY.to_string(), json!("not an array"));
        store.set(map).unwrap();

        let result: Result<Vec<Value>> = read_collection(&store, SAVED_THEMES_KEY);
        assert!(matches!(result, Err(ThemeError::Parse(_))));
    }
}
