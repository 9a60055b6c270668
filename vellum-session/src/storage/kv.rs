//! String-keyed key-value storage.
//!
//! The ledger talks to a [`KvStore`] trait: string keys, string values,
//! last-write-wins, each call fully replaces its target key. `RocksKv` is the
//! durable implementation; `MemoryKv` backs tests and keeps a write counter
//! so tests can observe commit coalescing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Storage errors shared by the key-value and blob stores.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// RocksDB internal error
    DatabaseError(String),
    /// Record not found
    NotFound(u64),
    /// Serialization failed
    SerializationError(String),
    /// Deserialization failed
    DeserializationError(String),
    /// Compression error
    CompressionError(String),
    /// I/O error
    IoError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DatabaseError(e) => write!(f, "Database error: {e}"),
            StoreError::NotFound(id) => write!(f, "Record not found: {id}"),
            StoreError::SerializationError(e) => write!(f, "Serialization error: {e}"),
            StoreError::DeserializationError(e) => write!(f, "Deserialization error: {e}"),
            StoreError::CompressionError(e) => write!(f, "Compression error: {e}"),
            StoreError::IoError(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// String-keyed, string-valued store. Last write wins; no versioning at this
/// layer.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// RocksDB-backed key-value store (default column family).
pub struct RocksKv {
    db: rocksdb::DBWithThreadMode<rocksdb::SingleThreaded>,
    path: PathBuf,
}

impl RocksKv {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        opts.set_keep_log_file_num(5);

        let db = rocksdb::DBWithThreadMode::<rocksdb::SingleThreaded>::open(&opts, &path)?;
        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvStore for RocksKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::DeserializationError(e.to_string())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.put(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.db.delete(key.as_bytes())?;
        Ok(())
    }
}

/// In-memory store for tests.
///
/// Tracks the number of writes so tests can assert that debounced commits
/// coalesce into a single write batch.
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("k").unwrap(), None);
        kv.put("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap(), Some("v".to_string()));
        kv.put("k", "v2").unwrap();
        assert_eq!(kv.get("k").unwrap(), Some("v2".to_string()));
        assert_eq!(kv.write_count(), 2);
    }

    #[test]
    fn memory_kv_delete_is_idempotent() {
        let kv = MemoryKv::new();
        kv.put("k", "v").unwrap();
        kv.delete("k").unwrap();
        kv.delete("k").unwrap();
        assert_eq!(kv.get("k").unwrap(), None);
    }

    #[test]
    fn rocks_kv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = RocksKv::open(dir.path().join("kv")).unwrap();
        kv.put("document.text", "hello").unwrap();
        assert_eq!(
            kv.get("document.text").unwrap(),
            Some("hello".to_string())
        );
        kv.delete("document.text").unwrap();
        assert_eq!(kv.get("document.text").unwrap(), None);
    }

    #[test]
    fn rocks_kv_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv");
        {
            let kv = RocksKv::open(&path).unwrap();
            kv.put("theme", "simple").unwrap();
        }
        let kv = RocksKv::open(&path).unwrap();
        assert_eq!(kv.get("theme").unwrap(), Some("simple".to_string()));
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound(7);
        assert!(err.to_string().contains("not found"));
        let err = StoreError::DatabaseError("boom".into());
        assert!(err.to_string().contains("Database error"));
    }
}
