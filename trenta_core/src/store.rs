//! String-keyed blob store with file locking.
//!
//! The engines persist whole JSON blobs under fixed keys (last write wins,
//! no transactions). `FileStore` keeps one file per key and writes
//! atomically via a locked temp file renamed over the original, so a
//! concurrently-reloading reader never sees a torn blob.

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persisted key for the exercise catalog
pub const EXERCISES_KEY: &str = "exercises_data";
/// Persisted key for the 30-day program
pub const WORKOUT_DAYS_KEY: &str = "workout_days_data";
/// Persisted key for the user profile
pub const USER_DATA_KEY: &str = "user_data";
/// Persisted key for the daily nutrition history
pub const NUTRITION_DATA_KEY: &str = "nutrition_data";
/// Persisted key for the computed nutrition goal
pub const NUTRITION_GOAL_KEY: &str = "nutrition_goal";
/// Persisted key for the UI language code
pub const APP_LANGUAGE_KEY: &str = "app_language";

/// Opaque string-keyed storage consumed by the engines
pub trait BlobStore {
    /// Read the blob stored under `key`, or None if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the blob under `key` (no-op if absent)
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-per-key store rooted at a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    /// Load a blob with shared locking
    ///
    /// An unreadable or unlockable file is treated as absent (with a
    /// warning) so a corrupted blob degrades to defaults instead of
    /// wedging the app.
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open blob {:?}: {}. Treating as absent.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock blob {:?}: {}. Treating as absent.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read blob {:?}: {}. Treating as absent.", path, e);
            return Ok(None);
        }

        if let Err(e) = file.unlock() {
            tracing::warn!("Unable to unlock blob {:?}: {}", path, e);
        }
        tracing::debug!("Loaded blob {} from {:?}", key, path);
        Ok(Some(contents))
    }

    /// Save a blob atomically
    ///
    /// Writes to a locked temp file in the same directory, syncs, then
    /// renames over the original.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.key_path(key);

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved blob {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed blob {} at {:?}", key, path);
        }
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemStore {
    blobs: std::sync::Mutex<HashMap<String, String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().expect("mem store poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.blobs
            .lock()
            .expect("mem store poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.blobs.lock().expect("mem store poisoned").remove(key);
        Ok(())
    }
}

/// Load and parse a JSON blob, falling back to None on parse failure
///
/// Parse failures are logged, not raised: the engines regenerate defaults
/// rather than surfacing a corrupted blob to the user.
pub fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key)? {
        None => Ok(None),
        Some(blob) => match serde_json::from_str::<T>(&blob) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Failed to parse blob {}: {}. Using defaults.", key, e);
                Ok(None)
            }
        },
    }
}

/// Serialize and persist a JSON blob, swallowing write errors
///
/// In-memory state is updated optimistically before/alongside the write;
/// a failed write leaves memory and storage inconsistent until the next
/// successful write. That gap is accepted for this data.
pub fn save_json<T: serde::Serialize>(store: &dyn BlobStore, key: &str, value: &T) {
    let blob = match serde_json::to_string(value) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!("Failed to serialize blob {}: {}", key, e);
            return;
        }
    };
    if let Err(e) = store.set(key, &blob) {
        tracing::warn!("Failed to persist blob {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("user_data", r#"{"weightKg":70.0}"#).unwrap();
        let blob = store.get("user_data").unwrap();
        assert_eq!(blob.as_deref(), Some(r#"{"weightKg":70.0}"#));
    }

    #[test]
    fn test_file_store_missing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_file_store_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("app_language", "\"en\"").unwrap();
        store.remove("app_language").unwrap();
        assert!(store.get("app_language").unwrap().is_none());
        // Removing again is a no-op
        store.remove("app_language").unwrap();
    }

    #[test]
    fn test_file_store_overwrite_is_last_write_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_get_succeeds_while_shared_lock_held() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.set("user_data", r#"{"weightKg":70.0}"#).unwrap();

        // A concurrent reader holding a shared lock must not turn the read
        // into an error; lock bookkeeping failures only warn
        let other = File::open(temp_dir.path().join("user_data.json")).unwrap();
        other.lock_shared().unwrap();

        let blob = store.get("user_data").unwrap();
        assert_eq!(blob.as_deref(), Some(r#"{"weightKg":70.0}"#));
        other.unlock().unwrap();
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.set("workout_days_data", "[]").unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "workout_days_data.json")
            .collect();
        assert!(extras.is_empty(), "stray files: {:?}", extras);
    }

    #[test]
    fn test_load_json_corrupted_returns_none() {
        let store = MemStore::new();
        store.set("user_data", "{ invalid json }").unwrap();

        let loaded: Option<crate::UserData> = load_json(&store, "user_data").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_load_json() {
        let store = MemStore::new();
        let data = crate::UserData {
            weight_kg: Some(82.5),
            ..Default::default()
        };
        save_json(&store, USER_DATA_KEY, &data);

        let loaded: Option<crate::UserData> = load_json(&store, USER_DATA_KEY).unwrap();
        assert_eq!(loaded.unwrap().weight_kg, Some(82.5));
    }
}
