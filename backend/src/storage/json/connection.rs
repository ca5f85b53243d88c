use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Connection to the JSON document store.
///
/// Each collection is one JSON file under the base directory. A single lock
/// covers the whole store so every read-modify-write cycle across the two
/// collections is serialized, standing in for a document database's
/// per-document write serialization.
#[derive(Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonConnection {
    /// Open (and create if needed) a store rooted at `base_directory`.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {:?}", base_path))?;
        }

        Ok(Self {
            base_directory: base_path,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn members_path(&self) -> PathBuf {
        self.base_directory.join("members.json")
    }

    pub fn suggestions_path(&self) -> PathBuf {
        self.base_directory.join("suggestions.json")
    }

    /// Take the store lock for one read-modify-write cycle.
    pub fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read a whole collection. A missing file is an empty collection.
    pub fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse collection {:?}", path))
    }

    /// Replace a whole collection. Written to a temp file first and renamed
    /// into place so a crash mid-write cannot truncate the collection.
    pub fn write_collection<T: Serialize>(&self, path: &Path, documents: &[T]) -> Result<()> {
        let content = serde_json::to_string_pretty(documents)
            .with_context(|| format!("Failed to serialize collection {:?}", path))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write collection {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace collection {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_collection_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let conn = JsonConnection::new(temp_dir.path()).unwrap();

        let docs: Vec<String> = conn.read_collection(&conn.members_path()).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let conn = JsonConnection::new(temp_dir.path()).unwrap();

        let docs = vec!["a".to_string(), "b".to_string()];
        conn.write_collection(&conn.members_path(), &docs).unwrap();

        let loaded: Vec<String> = conn.read_collection(&conn.members_path()).unwrap();
        assert_eq!(loaded, docs);
    }

    #[test]
    fn test_creates_missing_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("deep").join("store");

        let conn = JsonConnection::new(&nested).unwrap();

        assert!(nested.exists());
        assert_eq!(conn.base_directory(), nested.as_path());
    }
}
