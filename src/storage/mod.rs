//! Client-side storage for UI-only state
//!
//! Each key maps to one JSON document `<dir>/<key>.json` holding a small
//! envelope with the format version and last write time. Nothing stored here
//! is ever sent to the backend.

use crate::utils::{ensure_dir, read_json, write_json, ResultExt};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage key for the local preference record
pub const PREFERENCES_KEY: &str = "ralph-ui-settings";
/// Storage key for custom key-bar layouts and presets
pub const KEY_BAR_KEY: &str = "ralph-ui-key-bar";
/// Storage key for gesture thresholds
pub const GESTURES_KEY: &str = "ralph-ui-gestures";

const STORAGE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument<T> {
    version: u32,
    updated_at: DateTime<Utc>,
    value: T,
}

/// Outcome of reading a key
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue<T> {
    Found(T),
    Missing,
    /// The document exists but could not be read or parsed
    Corrupt { error: String },
}

impl<T> StoredValue<T> {
    /// Value if found, otherwise the fallback. Corruption is logged.
    pub fn or_recover(self, key: &str, fallback: impl FnOnce() -> T) -> (T, Option<String>) {
        match self {
            StoredValue::Found(value) => (value, None),
            StoredValue::Missing => (fallback(), None),
            StoredValue::Corrupt { error } => {
                log::warn!(
                    "[LocalStorage::load] Discarding unreadable '{}', using defaults: {}",
                    key,
                    error
                );
                (fallback(), Some(error))
            }
        }
    }
}

/// Directory-backed key/value store
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read and decode the document stored under `key`
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> StoredValue<T> {
        let path = self.path_for(key);
        if !path.exists() {
            return StoredValue::Missing;
        }

        match read_json::<StoredDocument<T>>(&path) {
            Ok(doc) => {
                if doc.version > STORAGE_FORMAT_VERSION {
                    log::debug!(
                        "[LocalStorage::load] '{}' written by newer format v{}",
                        key,
                        doc.version
                    );
                }
                StoredValue::Found(doc.value)
            }
            Err(error) => StoredValue::Corrupt { error },
        }
    }

    /// Encode and write `value` under `key`, replacing any previous document
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), String> {
        ensure_dir(&self.dir)?;
        let doc = StoredDocument {
            version: STORAGE_FORMAT_VERSION,
            updated_at: Utc::now(),
            value,
        };
        write_json(&self.path_for(key), &doc)?;
        log::debug!("[LocalStorage::save] Wrote '{}'", key);
        Ok(())
    }

    /// Delete the document under `key`. Missing keys are not an error.
    pub fn remove(&self, key: &str) -> Result<(), String> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path).with_context(&format!("Cannot remove {}", path.display()))?;
        }
        Ok(())
    }

    /// Time of the last write to `key`, if it holds a readable document
    pub fn updated_at(&self, key: &str) -> Option<DateTime<Utc>> {
        read_json::<StoredDocument<serde_json::Value>>(&self.path_for(key))
            .ok()
            .map(|doc| doc.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        size: u32,
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("settings"));

        let sample = Sample {
            name: "compact".to_string(),
            size: 12,
        };
        storage.save("sample", &sample).unwrap();

        assert_eq!(storage.load::<Sample>("sample"), StoredValue::Found(sample));
        assert!(storage.updated_at("sample").is_some());
    }

    #[test]
    fn test_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        assert_eq!(storage.load::<Sample>("nothing"), StoredValue::Missing);
        assert!(storage.remove("nothing").is_ok());
    }

    #[test]
    fn test_corrupt_document_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("sample.json"), "{\"version\":1,").unwrap();

        match storage.load::<Sample>("sample") {
            StoredValue::Corrupt { error } => assert!(error.contains("Invalid JSON")),
            other => panic!("expected corrupt value, got {:?}", other),
        }
    }

    #[test]
    fn test_or_recover_returns_error_for_corrupt_value() {
        let corrupt: StoredValue<u32> = StoredValue::Corrupt {
            error: "bad".to_string(),
        };
        assert_eq!(corrupt.or_recover("k", || 7), (7, Some("bad".to_string())));
        assert_eq!(StoredValue::Found(3).or_recover("k", || 7), (3, None));
        assert_eq!(StoredValue::<u32>::Missing.or_recover("k", || 7), (7, None));
    }

    #[test]
    fn test_remove_deletes_document() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        storage.save("sample", &1u32).unwrap();

        storage.remove("sample").unwrap();
        assert_eq!(storage.load::<u32>("sample"), StoredValue::Missing);
    }
}
