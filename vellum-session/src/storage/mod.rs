//! Durable storage for the editing session.
//!
//! Two stores, both backed by RocksDB in production:
//!
//! ```text
//! ┌──────────────┐   string keys    ┌─────────────────────────────┐
//! │ Persistence  │ ───────────────► │ KvStore                     │
//! │ Ledger       │                  │   RocksKv — default CF      │
//! └──────────────┘                  │   MemoryKv — tests          │
//!                                   └─────────────────────────────┘
//! ┌──────────────┐   u64 ids        ┌─────────────────────────────┐
//! │ pasted       │ ───────────────► │ BlobStore                   │
//! │ images       │                  │   CF "blobs"        records │
//! └──────────────┘                  │   CF "blobs_by_time" index  │
//!                                   └─────────────────────────────┘
//! ```
//!
//! Key-value operations are synchronous from the caller's perspective; blob
//! operations are async (the store runs in single-threaded RocksDB mode,
//! concurrency comes from tokio interleaving).

pub mod blob;
pub mod kv;

pub use blob::{BlobRecord, BlobStore, BlobStoreConfig};
pub use kv::{KvStore, MemoryKv, RocksKv, StoreError};
