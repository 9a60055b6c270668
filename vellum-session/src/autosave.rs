//! Debounced, fingerprint-gated autosave.
//!
//! A spawned task owns the save state machine:
//!
//! ```text
//!            edit                    timer expiry
//!   Idle ──────────► Pending ──────────────────► Committing
//!    ▲                  ▲ │ (re)start deadline        │
//!    │                  └─┘  trailing-edge            │ fingerprint equal → skip write
//!    └────────────────────────────────────────────────┘
//! ```
//!
//! Every document-changing event restarts the debounce deadline, so edits
//! inside one quiet window coalesce into a single commit that reads the
//! *current* document at fire time — no stale overwrites, no lost edits.
//! A commit whose fingerprint matches the last committed one is skipped
//! entirely while still reporting `Saved`.
//!
//! Failure policy: a failed commit is logged and leaves the visible status at
//! `Saving`; nothing re-arms automatically — the next edit restarts the
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use vellum_core::document::{Document, PersistedState};
use vellum_core::fingerprint::Fingerprint;

use crate::ledger::PersistenceLedger;
use crate::storage::StoreError;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet window after the last edit before a commit fires.
    pub debounce: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(1),
        }
    }
}

/// User-visible save status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// A save is pending or in flight (also shown after a failed commit).
    Saving,
    /// The last quiet window committed (or had nothing to commit).
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveState {
    Idle,
    Pending,
    Committing,
}

/// Handle to a running autosave task.
///
/// Dropping the handle (or calling [`close`](Self::close)) flushes a pending
/// window and stops the task.
pub struct AutosaveHandle {
    edits: mpsc::UnboundedSender<()>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Report a document-changing event; restarts the debounce window.
    pub fn document_changed(&self) {
        let _ = self.edits.send(());
    }

    /// Current visible status.
    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    /// A watch receiver for status changes (for status indicators).
    pub fn status_watch(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Flush any pending window and stop the task.
    pub async fn close(self) {
        drop(self.edits);
        let _ = self.task.await;
    }
}

/// Spawn the autosave task for a session.
///
/// `last_committed` seeds the fingerprint gate so a freshly loaded, unchanged
/// document does not trigger a redundant first write.
pub fn spawn(
    config: AutosaveConfig,
    doc: Arc<RwLock<Document>>,
    theme: Arc<RwLock<String>>,
    ledger: Arc<PersistenceLedger>,
    last_committed: Option<Fingerprint>,
) -> AutosaveHandle {
    let (edits_tx, mut edits_rx) = mpsc::unbounded_channel::<()>();
    let (status_tx, status_rx) = watch::channel(SaveStatus::Saved);

    let task = tokio::spawn(async move {
        let mut state = SaveState::Idle;
        let mut deadline = Instant::now();
        let mut last_committed = last_committed;

        loop {
            tokio::select! {
                msg = edits_rx.recv() => match msg {
                    Some(()) => {
                        state = SaveState::Pending;
                        deadline = Instant::now() + config.debounce;
                        let _ = status_tx.send(SaveStatus::Saving);
                    }
                    None => {
                        // Session teardown: flush a pending window so the
                        // last edits are not lost.
                        if state == SaveState::Pending {
                            if let Err(e) =
                                commit(&doc, &theme, &ledger, &mut last_committed).await
                            {
                                log::error!("Final autosave flush failed: {e}");
                            }
                        }
                        break;
                    }
                },
                _ = sleep_until(deadline), if state == SaveState::Pending => {
                    state = SaveState::Committing;
                    match commit(&doc, &theme, &ledger, &mut last_committed).await {
                        Ok(wrote) => {
                            if wrote {
                                log::debug!("Autosave committed");
                            } else {
                                log::debug!("Content unchanged, commit skipped");
                            }
                            let _ = status_tx.send(SaveStatus::Saved);
                        }
                        Err(e) => {
                            // Surface through the status indicator: stays at
                            // Saving until the next edit re-arms the cycle.
                            log::error!("Autosave commit failed: {e}");
                        }
                    }
                    state = SaveState::Idle;
                }
            }
        }
    });

    AutosaveHandle {
        edits: edits_tx,
        status: status_rx,
        task,
    }
}

/// Commit the current document unless its fingerprint matches the last
/// committed one. Returns whether a write happened.
async fn commit(
    doc: &RwLock<Document>,
    theme: &RwLock<String>,
    ledger: &PersistenceLedger,
    last_committed: &mut Option<Fingerprint>,
) -> Result<bool, StoreError> {
    // Snapshot at fire time — edits during the window coalesce into this.
    let snapshot = doc.read().await.clone();
    let theme = theme.read().await.clone();

    let fingerprint = Fingerprint::of(&snapshot.text, &snapshot.title, &snapshot.author);
    if *last_committed == Some(fingerprint) {
        return Ok(false);
    }

    ledger.commit(&PersistedState {
        text: snapshot.text,
        title: snapshot.title,
        author: snapshot.author,
        fingerprint: fingerprint.to_string(),
        theme,
    })?;
    *last_committed = Some(fingerprint);
    Ok(true)
}
