//! The editing session context object.
//!
//! `EditorSession` replaces ad-hoc global state with one owner: the live
//! document, the active theme, the persistence ledger, the lazily opened blob
//! store, the renderer seam, the scroll-sync state and the autosave handle
//! all live here, created on open and torn down on close.
//!
//! Failure semantics: a failed side effect (render, save, asset I/O) is
//! surfaced but never mutates or loses the document text — the raw text
//! buffer is the source of truth for the session.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::sync::{OnceCell, RwLock};

use vellum_core::document::{Document, DocumentStats, VersionEntry};
use vellum_core::export;
use vellum_core::fingerprint::Fingerprint;
use vellum_core::markup::{self, IndentDirection, MarkupError, Selection, StyleKind};
use vellum_core::render::Render;
use vellum_core::viewport::{PaneMetrics, ScrollSync};

use crate::asset::{self, AssetError, PastedAsset};
use crate::autosave::{self, AutosaveConfig, AutosaveHandle, SaveStatus};
use crate::ledger::{self, PersistenceLedger};
use crate::storage::{BlobRecord, BlobStore, BlobStoreConfig, KvStore, RocksKv, StoreError};

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the ledger and blob databases.
    pub data_dir: PathBuf,
    /// Autosave debounce settings.
    pub autosave: AutosaveConfig,
    /// Theme applied when the store has none persisted.
    pub default_theme: String,
}

impl SessionConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            autosave: AutosaveConfig::default(),
            default_theme: "simple".to_string(),
        }
    }
}

/// Errors from session operations that cross component boundaries.
#[derive(Debug)]
pub enum SessionError {
    Asset(AssetError),
    Markup(MarkupError),
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Asset(e) => write!(f, "Asset error: {e}"),
            SessionError::Markup(e) => write!(f, "Markup error: {e}"),
            SessionError::Store(e) => write!(f, "Storage error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<AssetError> for SessionError {
    fn from(e: AssetError) -> Self {
        SessionError::Asset(e)
    }
}

impl From<MarkupError> for SessionError {
    fn from(e: MarkupError) -> Self {
        SessionError::Markup(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

/// Result of pasting an image into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteOutcome {
    /// Id of the stored blob record; `None` when blob storage failed (the
    /// markup was still inserted — the failure only costs durability).
    pub blob_id: Option<u64>,
    /// Caret position after the inserted markup.
    pub selection: Selection,
}

/// One editing session over one document.
pub struct EditorSession {
    doc: Arc<RwLock<Document>>,
    theme: Arc<RwLock<String>>,
    ledger: Arc<PersistenceLedger>,
    blob_config: BlobStoreConfig,
    blobs: OnceCell<BlobStore>,
    renderer: Arc<dyn Render + Send + Sync>,
    scroll: StdMutex<ScrollSync>,
    autosave: AutosaveHandle,
}

impl EditorSession {
    /// Open a session backed by RocksDB under `config.data_dir`.
    ///
    /// Must be called within a tokio runtime — the autosave task is spawned
    /// here. The persisted snapshot, if any, is loaded into the live
    /// document.
    pub fn open(
        config: SessionConfig,
        renderer: Arc<dyn Render + Send + Sync>,
    ) -> Result<Self, StoreError> {
        let kv = RocksKv::open(config.data_dir.join("ledger"))?;
        let blob_config = BlobStoreConfig::new(config.data_dir.join("blobs"));
        Self::with_store(Box::new(kv), blob_config, config, renderer)
    }

    /// Open over an explicit key-value store (tests use `MemoryKv`).
    pub fn with_store(
        kv: Box<dyn KvStore>,
        blob_config: BlobStoreConfig,
        config: SessionConfig,
        renderer: Arc<dyn Render + Send + Sync>,
    ) -> Result<Self, StoreError> {
        let ledger = Arc::new(PersistenceLedger::new(kv));

        let (document, theme, seed) = match ledger.load()? {
            Some(state) => {
                log::info!("Restored persisted document ({} bytes)", state.text.len());
                let seed = Fingerprint::parse(&state.fingerprint);
                let theme = if state.theme.is_empty() {
                    config.default_theme.clone()
                } else {
                    state.theme
                };
                (
                    Document::new(state.text, state.title, state.author),
                    theme,
                    seed,
                )
            }
            None => (Document::default(), config.default_theme.clone(), None),
        };

        let doc = Arc::new(RwLock::new(document));
        let theme = Arc::new(RwLock::new(theme));
        let autosave = autosave::spawn(
            config.autosave,
            doc.clone(),
            theme.clone(),
            ledger.clone(),
            seed,
        );

        Ok(Self {
            doc,
            theme,
            ledger,
            blob_config,
            blobs: OnceCell::new(),
            renderer,
            scroll: StdMutex::new(ScrollSync::default()),
            autosave,
        })
    }

    // ─── Document access ──────────────────────────────────────────────

    /// Snapshot of the live document.
    pub async fn document(&self) -> Document {
        self.doc.read().await.clone()
    }

    /// Replace the raw text (the direct-edit path).
    pub async fn set_text(&self, text: impl Into<String>) {
        self.doc.write().await.text = text.into();
        self.autosave.document_changed();
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.doc.write().await.title = title.into();
        self.autosave.document_changed();
    }

    pub async fn set_author(&self, author: impl Into<String>) {
        self.doc.write().await.author = author.into();
        self.autosave.document_changed();
    }

    /// Empty all document fields.
    pub async fn clear(&self) {
        *self.doc.write().await = Document::default();
        self.autosave.document_changed();
    }

    /// Text statistics for the status bar.
    pub async fn stats(&self) -> DocumentStats {
        self.doc.read().await.stats()
    }

    // ─── Structured mutations ─────────────────────────────────────────

    /// Apply a markup action to the selection; returns the selection to
    /// restore in the editing surface.
    pub async fn apply_style(
        &self,
        sel: Selection,
        kind: &StyleKind,
    ) -> Result<Selection, MarkupError> {
        let mut doc = self.doc.write().await;
        let mutation = markup::apply_wrap(&doc.text, sel, kind)?;
        doc.text = mutation.text;
        drop(doc);

        self.autosave.document_changed();
        Ok(mutation.selection)
    }

    /// Indent or outdent every line touched by the selection.
    pub async fn apply_indent(
        &self,
        sel: Selection,
        direction: IndentDirection,
    ) -> Result<Selection, MarkupError> {
        let mut doc = self.doc.write().await;
        let mutation = markup::apply_indent(&doc.text, sel, direction)?;
        doc.text = mutation.text;
        drop(doc);

        self.autosave.document_changed();
        Ok(mutation.selection)
    }

    /// Insert a link at the selection, using the selected text as the label.
    pub async fn insert_link(
        &self,
        sel: Selection,
        url: impl Into<String>,
    ) -> Result<Selection, MarkupError> {
        self.apply_style(sel, &StyleKind::Link { url: url.into() })
            .await
    }

    /// Ingest a pasted image: encode, store as a blob, splice image markup
    /// at the caret.
    ///
    /// A blob-store failure is logged and reported through the outcome, but
    /// the markup is still inserted with the encoded payload — the document
    /// text never depends on a storage side effect succeeding.
    pub async fn insert_pasted_image(
        &self,
        asset: &PastedAsset,
        caret: Selection,
    ) -> Result<PasteOutcome, SessionError> {
        let data_url = asset::encode_data_url(asset)?;

        let blob_id = match self.blobs().await {
            Ok(store) => match store.store(data_url.clone()).await {
                Ok(id) => Some(id),
                Err(e) => {
                    log::error!("Failed to persist pasted image: {e}");
                    None
                }
            },
            Err(e) => {
                log::error!("Blob store unavailable: {e}");
                None
            }
        };

        let mut doc = self.doc.write().await;
        let mutation = markup::apply_wrap(
            &doc.text,
            caret,
            &StyleKind::Image {
                alt: "image".to_string(),
                src: data_url,
            },
        )?;
        doc.text = mutation.text;
        drop(doc);

        self.autosave.document_changed();
        Ok(PasteOutcome {
            blob_id,
            selection: mutation.selection,
        })
    }

    // ─── Preview & scroll ─────────────────────────────────────────────

    /// Render the current text through the external renderer.
    pub async fn preview(&self) -> String {
        let doc = self.doc.read().await;
        self.renderer.render(&doc.text)
    }

    /// Mirror one pane's scroll fraction onto the other.
    ///
    /// Returns the offset to apply to the target, or `None` when the request
    /// was dropped by the re-entrancy guard.
    pub fn mirror_scroll(&self, source: &PaneMetrics, target: &PaneMetrics) -> Option<f64> {
        match self.scroll.lock() {
            Ok(mut sync) => sync.mirror(source, target),
            Err(_) => None,
        }
    }

    // ─── Versions ─────────────────────────────────────────────────────

    /// Snapshot the current document into the version ring.
    pub async fn save_version(&self) -> Result<VersionEntry, StoreError> {
        let entry = ledger::snapshot_version(&*self.doc.read().await);
        self.ledger.push_version(entry.clone())?;
        log::info!("Saved version {}", entry.id);
        Ok(entry)
    }

    /// Saved versions, newest-first.
    pub fn list_versions(&self) -> Result<Vec<VersionEntry>, StoreError> {
        self.ledger.list_versions()
    }

    /// Restore a saved version into the live document.
    ///
    /// A missing id is a silent no-op returning `false`.
    pub async fn restore_version(&self, id: u64) -> Result<bool, StoreError> {
        let version = match self.ledger.find_version(id)? {
            Some(v) => v,
            None => {
                log::warn!("Restore of unknown version {id} ignored");
                return Ok(false);
            }
        };

        let mut doc = self.doc.write().await;
        doc.text = version.content;
        doc.title = version.title;
        doc.author = version.author;
        drop(doc);

        self.autosave.document_changed();
        Ok(true)
    }

    /// Delete a saved version. Deleting a missing id is a no-op.
    pub fn delete_version(&self, id: u64) -> Result<(), StoreError> {
        self.ledger.remove_version(id)
    }

    // ─── Theme ────────────────────────────────────────────────────────

    pub async fn theme(&self) -> String {
        self.theme.read().await.clone()
    }

    /// Switch themes; written through immediately, not debounced.
    pub async fn set_theme(&self, name: impl Into<String>) -> Result<(), StoreError> {
        let name = name.into();
        self.ledger.put_theme(&name)?;
        *self.theme.write().await = name;
        Ok(())
    }

    // ─── Blobs ────────────────────────────────────────────────────────

    /// The blob store, opened on first access and memoized for the session
    /// lifetime.
    pub async fn blobs(&self) -> Result<&BlobStore, StoreError> {
        self.blobs
            .get_or_try_init(|| async { BlobStore::open(self.blob_config.clone()) })
            .await
    }

    /// Stored images, oldest first.
    pub async fn list_images(&self) -> Result<Vec<BlobRecord>, StoreError> {
        self.blobs().await?.list_chronological().await
    }

    /// Delete a stored image. References in the document text are left
    /// alone; they degrade to a missing image at render time.
    pub async fn delete_image(&self, id: u64) -> Result<(), StoreError> {
        self.blobs().await?.delete(id).await
    }

    // ─── Export ───────────────────────────────────────────────────────

    /// Plain markdown export with title header and optional author line.
    pub async fn export_markdown(&self) -> String {
        export::markdown_document(&*self.doc.read().await)
    }

    /// Standalone HTML document for printing.
    pub async fn export_print_html(&self) -> String {
        let doc = self.doc.read().await.clone();
        let html = self.renderer.render(&doc.text);
        export::print_document(&doc, &html)
    }

    /// Inline-styled HTML fragment for clipboard copy.
    pub async fn export_clipboard_html(&self) -> String {
        let doc = self.doc.read().await.clone();
        let html = self.renderer.render(&doc.text);
        export::clipboard_fragment(&doc, &html)
    }

    // ─── Status & teardown ────────────────────────────────────────────

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn status_watch(&self) -> tokio::sync::watch::Receiver<SaveStatus> {
        self.autosave.status_watch()
    }

    /// Flush any pending autosave window and stop the scheduler.
    pub async fn close(self) {
        self.autosave.close().await;
    }
}
