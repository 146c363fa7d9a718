mod common;

use std::sync::Arc;
use common::{artifact, options};
use mhs_collections::compression::compress::CompressionType;
use mhs_collections::progress::{Progress, ProgressSink, ProgressState};
use mhs_collections::transport::{FileTransport, MemoryTransport, Transport};
use mhs_collections::{CatalogSession, Config, Database, ErrorKind};

fn config(backups: &std::path::Path) -> Config {
    Config {
        editor_name: "curator".to_string(),
        local_backup_dir: backups.to_path_buf(),
        transfer_chunk_size: options().chunk_size,
        compression: CompressionType::LZ4,
        ..Config::default()
    }
}

fn memory_session(config: Config) -> (MemoryTransport, CatalogSession) {
    let remote = MemoryTransport::new();
    let transport: Arc<dyn Transport> = Arc::new(remote.clone());
    let session = CatalogSession::open(config, transport, Progress::none()).unwrap();
    (remote, session)
}

#[test]
fn fresh_directory_starts_empty_and_syncs() {
    let root = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    let transport: Arc<dyn Transport> = Arc::new(FileTransport::new(root.path()));

    let session = CatalogSession::open(config(backups.path()), transport, Progress::none()).unwrap();
    session.ensure_dirs().unwrap();
    assert!(root.path().join("database/archives").is_dir());
    assert!(root.path().join("rsc").is_dir());
    assert!(session.database().is_empty());

    session.database().add(artifact("1998.004.1", "Butter churn")).unwrap();
    let report = session.sync(Progress::none()).unwrap();
    assert_eq!(report.canonical_path, "database/database.store");

    let archives = session.list_archives().unwrap();
    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0].millis, report.millis);
    assert_eq!(session.database().stats().last_editor.as_deref(), Some("curator"));
}

#[test]
fn sync_prunes_to_the_archive_limit() {
    let backups = tempfile::tempdir().unwrap();
    let (remote, session) = memory_session(Config {
        archive_limit: Some(2),
        ..config(backups.path())
    });

    let mut last = 0;
    for _ in 0..4 {
        last = session.sync(Progress::none()).unwrap().millis;
    }
    let archives = session.list_archives().unwrap();
    assert_eq!(archives.len(), 2);
    assert_eq!(archives[0].millis, last);
    assert_eq!(remote.list("database/archives").unwrap().len(), 2);
}

#[test]
fn restoring_an_archive_publishes_it_as_a_new_sync() {
    let backups = tempfile::tempdir().unwrap();
    let (remote, session) = memory_session(config(backups.path()));
    let db = session.database();

    db.add(artifact("A-1", "First")).unwrap();
    session.sync(Progress::none()).unwrap();
    db.add(artifact("A-2", "Second")).unwrap();
    session.sync(Progress::none()).unwrap();

    let oldest = session.list_archives().unwrap().pop().unwrap();
    let report = session.restore_archive(&oldest, Progress::none()).unwrap();
    assert!(report.millis > oldest.millis);
    assert_eq!(db.size(), 1);
    assert_eq!(session.list_archives().unwrap().len(), 3);

    let shared = remote.clone();
    let reloaded = Database::load(&shared, &session.config().layout(), &options(), Progress::none()).unwrap();
    assert_eq!(reloaded.size(), 1);
    assert!(reloaded.contains("A-1"));
}

#[test]
fn restoring_a_local_backup() {
    let backups = tempfile::tempdir().unwrap();
    let (_remote, session) = memory_session(config(backups.path()));
    let db = session.database();

    db.add(artifact("A-1", "Kept offline")).unwrap();
    let path = session.write_local_backup().unwrap();
    assert_eq!(session.list_local_backups().unwrap().len(), 1);

    db.remove_by_accession("A-1");
    assert!(db.is_empty());

    session.restore_local(&path, Progress::none()).unwrap();
    assert!(db.contains("A-1"));
    assert_eq!(session.list_archives().unwrap().len(), 1);
}

#[test]
fn reload_picks_up_another_sessions_sync() {
    let backups = tempfile::tempdir().unwrap();
    let (remote, editor) = memory_session(config(backups.path()));
    let viewer = CatalogSession::open(
        config(backups.path()),
        Arc::new(remote.clone()),
        Progress::none(),
    )
    .unwrap();

    editor.database().add(artifact("A-1", "New")).unwrap();
    editor.sync(Progress::none()).unwrap();
    assert!(viewer.database().is_empty());

    viewer.reload(Progress::none()).unwrap();
    assert!(viewer.database().contains("A-1"));
}

#[test]
fn offline_transport_is_reported() {
    let remote = MemoryTransport::new();
    remote.set_available(false);
    let backups = tempfile::tempdir().unwrap();
    let err = CatalogSession::open(config(backups.path()), Arc::new(remote), Progress::none())
        .err()
        .unwrap();
    assert_eq!(err.kind, ErrorKind::TransportUnavailable);
}

#[tokio::test]
async fn load_and_sync_in_background() {
    let remote = MemoryTransport::new();
    let backups = tempfile::tempdir().unwrap();
    let state = Arc::new(ProgressState::new());
    let sink: Arc<dyn ProgressSink> = state.clone();

    let session = CatalogSession::load_in_background(config(backups.path()), Arc::new(remote.clone()), None)
        .await
        .unwrap();
    session.database().add(artifact("A-1", "Barn")).unwrap();

    let report = session.sync_in_background(Some(sink)).await.unwrap();
    assert_eq!(state.percent(), 100);
    assert!(state.notes().iter().any(|note| note.starts_with("Archiving")));
    assert!(remote.exists(&report.archive_path));

    let reopened = CatalogSession::load_in_background(config(backups.path()), Arc::new(remote), None)
        .await
        .unwrap();
    assert!(reopened.database().contains("A-1"));
}

#[tokio::test]
async fn background_sync_can_be_cancelled() {
    let remote = MemoryTransport::new();
    let backups = tempfile::tempdir().unwrap();
    let session = CatalogSession::open(config(backups.path()), Arc::new(remote.clone()), Progress::none()).unwrap();
    session.database().add(artifact("A-1", "Barn")).unwrap();

    let state = Arc::new(ProgressState::new());
    state.cancel();
    let sink: Arc<dyn ProgressSink> = state;
    let err = session.sync_in_background(Some(sink)).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(!remote.exists("database/database.store"));
}
