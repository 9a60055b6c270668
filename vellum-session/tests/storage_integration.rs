//! Storage integration tests over real RocksDB.
//!
//! Verifies:
//! - Ledger roundtrip through `RocksKv`, including reopen
//! - Version ring persistence across reopen
//! - Blob id sequence recovery after restart
//! - A full RocksDB-backed session: edit, autosave, reopen, restore

use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use tokio::time::sleep;

use vellum_core::document::PersistedState;
use vellum_session::{
    BlobStore, BlobStoreConfig, EditorSession, PersistenceLedger, RocksKv, SessionConfig,
};

fn renderer() -> Arc<dyn vellum_core::Render + Send + Sync> {
    Arc::new(|md: &str| md.to_string())
}

#[test]
fn ledger_over_rocksdb_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger");

    {
        let ledger = PersistenceLedger::new(Box::new(RocksKv::open(&path).unwrap()));
        ledger
            .commit(&PersistedState {
                text: "durable".into(),
                title: "t".into(),
                author: "a".into(),
                fingerprint: "00ff00ff00ff00ff".into(),
                theme: "simple".into(),
            })
            .unwrap();
    }

    let ledger = PersistenceLedger::new(Box::new(RocksKv::open(&path).unwrap()));
    let state = ledger.load().unwrap().unwrap();
    assert_eq!(state.text, "durable");
    assert_eq!(state.fingerprint, "00ff00ff00ff00ff");
}

#[test]
fn version_ring_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger");

    {
        let ledger = PersistenceLedger::new(Box::new(RocksKv::open(&path).unwrap()));
        for id in 1..=12 {
            ledger
                .push_version(vellum_core::VersionEntry {
                    id,
                    title: format!("v{id}"),
                    content: format!("c{id}"),
                    author: String::new(),
                    display_timestamp: String::new(),
                })
                .unwrap();
        }
    }

    let ledger = PersistenceLedger::new(Box::new(RocksKv::open(&path).unwrap()));
    let versions = ledger.list_versions().unwrap();
    assert_eq!(versions.len(), 10);
    assert_eq!(versions.first().map(|v| v.id), Some(12));
    assert_eq!(versions.last().map(|v| v.id), Some(3));
}

#[tokio::test]
async fn blob_sequence_recovers_after_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blobs");

    let mut ids = Vec::new();
    {
        let store = BlobStore::open(BlobStoreConfig::for_testing(&path)).unwrap();
        for i in 0..3 {
            ids.push(store.store(format!("data:image/png;base64,{i}")).await.unwrap());
        }
    }

    let store = BlobStore::open(BlobStoreConfig::for_testing(&path)).unwrap();
    let next = store.store("data:image/png;base64,x".into()).await.unwrap();
    assert!(next > *ids.last().unwrap());

    let records = store.list_chronological().await.unwrap();
    assert_eq!(records.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn full_rocksdb_session_roundtrip() {
    let dir = tempdir().unwrap();
    let config = SessionConfig::new(dir.path());

    {
        let session = EditorSession::open(config.clone(), renderer()).unwrap();
        session.set_text("# Written through RocksDB").await;
        session.set_title("Durable post").await;
        sleep(Duration::from_secs(2)).await;
        session.save_version().await.unwrap();
        session.close().await;
    }

    let session = EditorSession::open(config, renderer()).unwrap();
    let doc = session.document().await;
    assert_eq!(doc.text, "# Written through RocksDB");
    assert_eq!(doc.title, "Durable post");

    let versions = session.list_versions().unwrap();
    assert_eq!(versions.len(), 1);
    assert!(session.restore_version(versions[0].id).await.unwrap());
    session.close().await;
}
