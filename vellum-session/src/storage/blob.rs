//! RocksDB-backed blob store for binary assets (pasted/uploaded images).
//!
//! Column families:
//! - `blobs`         — records keyed by auto-incrementing id (8-byte BE),
//!                     values LZ4-compressed bincode
//! - `blobs_by_time` — secondary index keyed by `timestamp ‖ id`, for
//!                     chronological listing (not needed for correctness)
//!
//! Ids are assigned from an in-process sequence recovered from the highest
//! existing key on open, so they keep increasing across restarts. Records
//! persist until explicitly deleted; deleting a missing id succeeds silently.
//! Document text references blobs by embedded payload, so a deleted record
//! degrades to a missing image rather than an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use rocksdb::{
    ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, Options, SingleThreaded, WriteBatch,
};
use serde::{Deserialize, Serialize};

use super::kv::StoreError;

const CF_BLOBS: &str = "blobs";
const CF_BLOBS_BY_TIME: &str = "blobs_by_time";

const COLUMN_FAMILIES: &[&str] = &[CF_BLOBS, CF_BLOBS_BY_TIME];

/// Blob store configuration.
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    /// Database directory path
    pub path: PathBuf,
    /// Max open files for RocksDB (default: 256)
    pub max_open_files: i32,
    /// Write buffer size per column family (default: 8MB)
    pub write_buffer_size: usize,
}

impl BlobStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_open_files: 256,
            write_buffer_size: 8 * 1024 * 1024,
        }
    }

    /// Config for testing (small buffers, temp directory).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_open_files: 64,
            write_buffer_size: 1024 * 1024,
        }
    }
}

/// A stored binary asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Auto-assigned id.
    pub id: u64,
    /// Data-URL-encoded payload.
    pub data: String,
    /// Creation time, milliseconds since the epoch.
    pub timestamp: u64,
}

impl BlobRecord {
    fn encode(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        let (record, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| StoreError::DeserializationError(e.to_string()))?;
        Ok(record)
    }
}

/// RocksDB-backed blob store.
///
/// Methods are async from the caller's perspective; the database runs in
/// single-threaded mode and concurrency comes from tokio interleaving.
pub struct BlobStore {
    db: DBWithThreadMode<SingleThreaded>,
    config: BlobStoreConfig,
    /// Next id to assign.
    sequence: AtomicU64,
}

impl BlobStore {
    /// Open the blob store at the configured path.
    ///
    /// Creates the database and column families if they don't exist. Opening
    /// is idempotent at the session level — the session memoizes the handle.
    pub fn open(config: BlobStoreConfig) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_keep_log_file_num(5);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_write_buffer_size(config.write_buffer_size);
                cf_opts.set_compression_type(rocksdb::DBCompressionType::None);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DBWithThreadMode::<SingleThreaded>::open_cf_descriptors(
            &db_opts,
            &config.path,
            cf_descriptors,
        )?;

        let sequence = Self::recover_sequence(&db);

        Ok(Self {
            db,
            config,
            sequence: AtomicU64::new(sequence),
        })
    }

    /// Recover the next id from the highest existing blob key.
    fn recover_sequence(db: &DBWithThreadMode<SingleThreaded>) -> u64 {
        let cf = match db.cf_handle(CF_BLOBS) {
            Some(cf) => cf,
            None => return 1,
        };

        let mut iter = db.iterator_cf(&cf, IteratorMode::End);
        match iter.next() {
            Some(Ok((key, _))) if key.len() >= 8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&key[..8]);
                u64::from_be_bytes(buf) + 1
            }
            _ => 1,
        }
    }

    /// Store a payload, returning the assigned id.
    ///
    /// Record and time-index entry are written in one atomic batch.
    pub async fn store(&self, data: String) -> Result<u64, StoreError> {
        let cf_blobs = self.cf(CF_BLOBS)?;
        let cf_time = self.cf(CF_BLOBS_BY_TIME)?;

        let id = self.sequence.fetch_add(1, Ordering::SeqCst);
        let record = BlobRecord {
            id,
            data,
            timestamp: now_millis(),
        };

        let compressed = lz4_flex::compress_prepend_size(&record.encode()?);

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_blobs, id.to_be_bytes(), &compressed);
        batch.put_cf(
            &cf_time,
            time_index_key(record.timestamp, id),
            id.to_be_bytes(),
        );
        self.db.write(batch)?;

        log::debug!("Stored blob {id} ({} bytes compressed)", compressed.len());
        Ok(id)
    }

    /// List every stored record, in key (insertion) order.
    pub async fn list_all(&self) -> Result<Vec<BlobRecord>, StoreError> {
        let cf = self.cf(CF_BLOBS)?;
        let mut records = Vec::new();

        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            let decompressed = lz4_flex::decompress_size_prepended(&value)
                .map_err(|e| StoreError::CompressionError(e.to_string()))?;
            records.push(BlobRecord::decode(&decompressed)?);
        }

        Ok(records)
    }

    /// List records in creation order via the time index.
    pub async fn list_chronological(&self) -> Result<Vec<BlobRecord>, StoreError> {
        let cf_time = self.cf(CF_BLOBS_BY_TIME)?;
        let cf_blobs = self.cf(CF_BLOBS)?;
        let mut records = Vec::new();

        let iter = self.db.iterator_cf(&cf_time, IteratorMode::Start);
        for item in iter {
            let (_, id_bytes) = item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            if let Some(value) = self.db.get_cf(&cf_blobs, &id_bytes)? {
                let decompressed = lz4_flex::decompress_size_prepended(&value)
                    .map_err(|e| StoreError::CompressionError(e.to_string()))?;
                records.push(BlobRecord::decode(&decompressed)?);
            }
        }

        Ok(records)
    }

    /// Delete a record. Deleting a missing id succeeds silently.
    pub async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let cf_blobs = self.cf(CF_BLOBS)?;
        let cf_time = self.cf(CF_BLOBS_BY_TIME)?;

        // Need the timestamp to drop the index entry; a missing record means
        // there is nothing to do.
        let record = match self.db.get_cf(&cf_blobs, id.to_be_bytes())? {
            Some(value) => {
                let decompressed = lz4_flex::decompress_size_prepended(&value)
                    .map_err(|e| StoreError::CompressionError(e.to_string()))?;
                BlobRecord::decode(&decompressed)?
            }
            None => return Ok(()),
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_blobs, id.to_be_bytes());
        batch.delete_cf(&cf_time, time_index_key(record.timestamp, id));
        self.db.write(batch)?;

        log::debug!("Deleted blob {id}");
        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<usize, StoreError> {
        let cf = self.cf(CF_BLOBS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::DatabaseError(format!("Column family '{name}' not found")))
    }
}

/// `timestamp ‖ id`, both big-endian, so the index sorts chronologically with
/// the id breaking ties.
fn time_index_key(timestamp: u64, id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&timestamp.to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
