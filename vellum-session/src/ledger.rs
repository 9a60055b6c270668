//! The persistence ledger: one durable document snapshot plus a bounded
//! version history, over a string key-value store.
//!
//! Layout (all last-write-wins, each call fully replaces its key):
//!
//! | Key                    | Value                         |
//! |------------------------|-------------------------------|
//! | `document.text`        | raw markup text               |
//! | `document.title`       | title                         |
//! | `document.author`      | author                        |
//! | `document.fingerprint` | hex fingerprint at commit     |
//! | `session.theme`        | theme name                    |
//! | `versions`             | JSON array, newest-first      |
//!
//! The version ring holds at most [`MAX_VERSIONS`] entries; pushing an
//! eleventh evicts the oldest (insertion order, not access order).

use chrono::Local;
use vellum_core::document::{Document, PersistedState, VersionEntry};

use crate::storage::{KvStore, StoreError};

/// Capacity of the version ring.
pub const MAX_VERSIONS: usize = 10;

const KEY_TEXT: &str = "document.text";
const KEY_TITLE: &str = "document.title";
const KEY_AUTHOR: &str = "document.author";
const KEY_FINGERPRINT: &str = "document.fingerprint";
const KEY_THEME: &str = "session.theme";
const KEY_VERSIONS: &str = "versions";

/// Durable store of the current document fields and the version ring.
pub struct PersistenceLedger {
    kv: Box<dyn KvStore>,
}

impl PersistenceLedger {
    pub fn new(kv: Box<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Unconditionally overwrite the single stored snapshot.
    pub fn commit(&self, state: &PersistedState) -> Result<(), StoreError> {
        self.kv.put(KEY_TEXT, &state.text)?;
        self.kv.put(KEY_TITLE, &state.title)?;
        self.kv.put(KEY_AUTHOR, &state.author)?;
        self.kv.put(KEY_FINGERPRINT, &state.fingerprint)?;
        self.kv.put(KEY_THEME, &state.theme)?;
        Ok(())
    }

    /// Load the last-committed snapshot; `None` when the store is empty.
    /// Missing individual keys fill with defaults.
    pub fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        let text = self.kv.get(KEY_TEXT)?;
        let title = self.kv.get(KEY_TITLE)?;
        let author = self.kv.get(KEY_AUTHOR)?;
        let fingerprint = self.kv.get(KEY_FINGERPRINT)?;
        let theme = self.kv.get(KEY_THEME)?;

        if text.is_none()
            && title.is_none()
            && author.is_none()
            && fingerprint.is_none()
            && theme.is_none()
        {
            return Ok(None);
        }

        Ok(Some(PersistedState {
            text: text.unwrap_or_default(),
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            fingerprint: fingerprint.unwrap_or_default(),
            theme: theme.unwrap_or_default(),
        }))
    }

    /// Write through just the theme key (theme changes skip the debounce).
    pub fn put_theme(&self, theme: &str) -> Result<(), StoreError> {
        self.kv.put(KEY_THEME, theme)
    }

    /// Prepend a version entry, evicting the oldest past [`MAX_VERSIONS`].
    pub fn push_version(&self, entry: VersionEntry) -> Result<(), StoreError> {
        let mut versions = self.list_versions()?;
        versions.insert(0, entry);
        versions.truncate(MAX_VERSIONS);
        self.write_versions(&versions)
    }

    /// All saved versions, newest-first.
    pub fn list_versions(&self) -> Result<Vec<VersionEntry>, StoreError> {
        match self.kv.get(KEY_VERSIONS)? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| StoreError::DeserializationError(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    /// Look up a single version by id.
    pub fn find_version(&self, id: u64) -> Result<Option<VersionEntry>, StoreError> {
        Ok(self.list_versions()?.into_iter().find(|v| v.id == id))
    }

    /// Remove a version by id. Removing a missing id is a no-op.
    pub fn remove_version(&self, id: u64) -> Result<(), StoreError> {
        let mut versions = self.list_versions()?;
        let before = versions.len();
        versions.retain(|v| v.id != id);
        if versions.len() != before {
            self.write_versions(&versions)?;
        }
        Ok(())
    }

    fn write_versions(&self, versions: &[VersionEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string(versions)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        self.kv.put(KEY_VERSIONS, &json)
    }
}

/// Snapshot the current document into a new version entry.
///
/// The millisecond timestamp doubles as the id; an untitled document gets a
/// placeholder title so the history list stays readable.
pub fn snapshot_version(doc: &Document) -> VersionEntry {
    let now = Local::now();
    VersionEntry {
        id: now.timestamp_millis() as u64,
        title: if doc.title.is_empty() {
            "Untitled".to_string()
        } else {
            doc.title.clone()
        },
        content: doc.text.clone(),
        author: doc.author.clone(),
        display_timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
