mod common;

use common::{artifact, day, layout, options};
use mhs_collections::compression::compress::CompressionType;
use mhs_collections::core::types::V3DBundle;
use mhs_collections::progress::{Progress, ProgressState};
use mhs_collections::storage::container;
use mhs_collections::time::{parse_syntax, TimeSpec};
use mhs_collections::transport::{FileTransport, MemoryTransport, Transport};
use mhs_collections::{Database, ErrorKind};

fn sample_database() -> Database {
    let db = Database::new();
    db.add(artifact("1998.004.2", "Old Barn Photo").with_donor("H. Souza")).unwrap();

    let mut bundle_item = artifact("1998.004.1", "Butter churn").with_medium("Wood");
    bundle_item.configure_3d(
        V3DBundle::new("f.jpg", "r.jpg", "b.jpg", "l.jpg").unwrap().with_top_bottom("t.jpg", "u.jpg"),
    );
    db.add(bundle_item).unwrap();

    let mut undated = artifact("2003.117.9", "Town Map");
    undated.object_date = parse_syntax("%Y|1900-1910=Early 1900s").unwrap();
    undated.submission_date = TimeSpec::literal("sometime in spring");
    undated.configure_multi_image(vec!["map1.png".into(), "map2.png".into()]);
    db.add(undated).unwrap();
    db
}

fn sorted(db: &Database) -> Vec<mhs_collections::Artifact> {
    let mut records = db.snapshot();
    records.sort_by(|a, b| a.accession_number.cmp(&b.accession_number));
    records
}

#[test]
fn sync_then_load_restores_everything() {
    let transport = MemoryTransport::new();
    let db = sample_database();
    let report = db.sync(&transport, &layout(), "curator", &options(), Progress::none()).unwrap();

    let loaded = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(sorted(&loaded), sorted(&db));
    assert_eq!(loaded.timestamp_millis(), report.millis);
    assert_eq!(loaded.timestamp(), db.timestamp());
    assert_eq!(loaded.last_editor().as_deref(), Some("curator"));

    // Load order comes from the accession numbers, not from the file
    let order: Vec<String> = loaded.snapshot().into_iter().map(|a| a.accession_number).collect();
    assert_eq!(order, vec!["1998.004.1", "1998.004.2", "2003.117.9"]);
}

#[test]
fn blank_editor_is_stored_as_unknown() {
    let transport = MemoryTransport::new();
    let db = sample_database();
    db.sync(&transport, &layout(), "   ", &options(), Progress::none()).unwrap();

    let loaded = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(loaded.last_editor(), None);
    assert_eq!(loaded.stats().editor_label(), "unknown");
}

#[test]
fn missing_store_loads_empty() {
    let transport = MemoryTransport::new();
    let db = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(db.size(), 0);
    assert_eq!(db.timestamp(), None);
    assert_eq!(db.last_editor(), None);
}

#[test]
fn unavailable_transport_fails_fast() {
    let transport = MemoryTransport::new();
    transport.set_available(false);

    let err = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransportUnavailable);

    let err = sample_database()
        .sync(&transport, &layout(), "curator", &options(), Progress::none())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransportUnavailable);
    assert!(transport.paths().is_empty());
}

#[test]
fn unexpected_entry_name_is_malformed() {
    let transport = MemoryTransport::new();
    let bytes = container::encode("1700000000000.zip", b"payload", CompressionType::Zstd, 3).unwrap();
    transport.put(&layout().canonical_path(), bytes);

    let err = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedStore);
    assert!(err.context.contains("1700000000000.zip"));
}

#[test]
fn foreign_file_is_malformed() {
    let transport = MemoryTransport::new();
    transport.put(&layout().canonical_path(), b"PK\x03\x04 not ours".to_vec());

    let err = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedStore);
}

#[test]
fn progress_notes_follow_the_sync_and_load_steps() {
    let transport = MemoryTransport::new();
    let state = ProgressState::new();
    sample_database()
        .sync(&transport, &layout(), "curator", &options(), Progress::new(Some(&state)))
        .unwrap();
    assert_eq!(
        state.notes(),
        vec![
            "Compressing database... Please wait",
            "Uploading database store-file...",
            "Archiving database store-file...",
        ]
    );
    assert_eq!(state.percent(), 100);

    let state = ProgressState::new();
    Database::load(&transport, &layout(), &options(), Progress::new(Some(&state))).unwrap();
    assert_eq!(state.notes(), vec!["Downloading database store-file...", "Extracting database..."]);
    assert_eq!(state.percent(), 100);
}

#[test]
fn cancelled_upload_leaves_no_temp_file() {
    let transport = MemoryTransport::new();
    let state = ProgressState::new();
    state.cancel_on_note("Uploading");

    let err = sample_database()
        .sync(&transport, &layout(), "curator", &options(), Progress::new(Some(&state)))
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(!transport.exists(&layout().canonical_path()));
    assert!(transport.paths().iter().all(|path| !path.ends_with(".partial")));
    assert!(transport.list("database/archives").unwrap().is_empty());
}

#[test]
fn cancelled_download_is_reported() {
    let transport = MemoryTransport::new();
    sample_database().sync(&transport, &layout(), "curator", &options(), Progress::none()).unwrap();

    let state = ProgressState::new();
    state.cancel();
    let err = Database::load(&transport, &layout(), &options(), Progress::new(Some(&state))).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
}

#[test]
fn failed_archive_keeps_the_new_canonical_store() {
    let transport = MemoryTransport::new();
    transport.fail_writes_under("database/archives");

    let db = sample_database();
    let err = db.sync(&transport, &layout(), "curator", &options(), Progress::none()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ArchiveIncomplete);

    let loaded = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(loaded.size(), 3);
    assert_eq!(loaded.timestamp(), db.timestamp());
    assert!(transport.list("database/archives").unwrap().is_empty());
}

#[test]
fn local_backup_round_trip_keeps_the_stamp() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_database();
    let path = db.write_local(dir.path(), &options()).unwrap();

    assert!(path.file_name().unwrap().to_string_lossy().ends_with(".store"));
    assert_eq!(db.timestamp(), None);

    let restored = Database::open_local(&path).unwrap();
    assert_eq!(sorted(&restored), sorted(&db));
    assert_eq!(restored.timestamp(), None);
}

#[test]
fn file_transport_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let transport = FileTransport::new(dir.path());
    let db = sample_database();
    db.sync(&transport, &layout(), "curator", &options(), Progress::none()).unwrap();

    assert!(dir.path().join("database").join("database.store").is_file());
    let loaded = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(sorted(&loaded), sorted(&db));
    assert_eq!(transport.list("database").unwrap(), vec!["database.store"]);
}

#[test]
fn read_only_root_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let transport = FileTransport::new(dir.path());
    let db = sample_database();
    db.sync(&transport, &layout(), "curator", &options(), Progress::none()).unwrap();

    let mut permissions = std::fs::metadata(dir.path()).unwrap().permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(dir.path(), permissions.clone()).unwrap();

    let available = transport.is_available();
    let loaded = Database::load(&transport, &layout(), &options(), Progress::none());

    permissions.set_readonly(false);
    std::fs::set_permissions(dir.path(), permissions).unwrap();

    assert!(available);
    assert_eq!(sorted(&loaded.unwrap()), sorted(&db));
}

#[test]
fn missing_root_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let transport = FileTransport::new(dir.path().join("not-mounted"));
    assert!(!transport.is_available());
    let err = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransportUnavailable);
}

#[test]
fn every_codec_can_frame_the_store() {
    for compression in [CompressionType::None, CompressionType::LZ4, CompressionType::Zstd] {
        let transport = MemoryTransport::new();
        let opts = mhs_collections::StoreOptions { compression, ..options() };
        let db = sample_database();
        db.sync(&transport, &layout(), "curator", &opts, Progress::none()).unwrap();
        let loaded = Database::load(&transport, &layout(), &opts, Progress::none()).unwrap();
        assert_eq!(sorted(&loaded), sorted(&db));
    }
}

#[test]
fn reload_swaps_in_another_clients_sync() {
    let transport = MemoryTransport::new();
    let reader = Database::load(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(reader.size(), 0);

    let writer = sample_database();
    writer.sync(&transport.clone(), &layout(), "curator", &options(), Progress::none()).unwrap();

    reader.reload(&transport, &layout(), &options(), Progress::none()).unwrap();
    assert_eq!(reader.size(), 3);
    assert_eq!(reader.last_editor().as_deref(), Some("curator"));
    assert!(reader.timestamp().unwrap() > day(2000, 1, 1));
}
