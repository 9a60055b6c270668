//! # vellum-session — Asynchronous session layer for the Vellum authoring core
//!
//! Keeps the live document, its rendered preview, autosave persistence and a
//! bounded version history mutually consistent under continuous edits.
//!
//! Architecture:
//! ```text
//! edits ──► EditorSession ──► render seam ──► preview
//!               │    │
//!               │    └── document_changed()
//!               │              │
//!               │              ▼
//!               │      AutosaveScheduler (tokio task)
//!               │        Idle → Pending → Committing → Idle
//!               │              │ fingerprint-gated
//!               │              ▼
//!               │      PersistenceLedger ── KvStore (RocksDB / memory)
//!               │              │
//!               │              └── version ring (≤ 10, newest-first)
//!               │
//!               └── BlobStore (RocksDB, lazy-opened) ◄── pasted images
//! ```
//!
//! Concurrency is cooperative: one scheduler task per session, shared state
//! behind `tokio::sync::RwLock`, and at most one ledger commit per quiet
//! debounce window. A failed side effect (render, save, asset I/O) never
//! mutates or loses the document text.
//!
//! ## Modules
//!
//! - [`storage`] — key-value and blob stores over RocksDB
//! - [`asset`] — pasted/uploaded image ingestion (data-URL encoding)
//! - [`ledger`] — the persisted snapshot and bounded version ring
//! - [`autosave`] — the debounced, fingerprint-gated commit scheduler
//! - [`session`] — the `EditorSession` context object

pub mod asset;
pub mod autosave;
pub mod ledger;
pub mod session;
pub mod storage;

pub use asset::{AssetError, PastedAsset};
pub use autosave::{AutosaveConfig, AutosaveHandle, SaveStatus};
pub use ledger::PersistenceLedger;
pub use session::{EditorSession, PasteOutcome, SessionConfig, SessionError};
pub use storage::{BlobRecord, BlobStore, BlobStoreConfig, KvStore, MemoryKv, RocksKv, StoreError};
