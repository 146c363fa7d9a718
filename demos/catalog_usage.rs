/// Catalog walkthrough
///
/// Builds a small catalog on a local directory transport, then:
/// - adds, overwrites and removes artifacts
/// - searches titles and dates
/// - syncs, lists archives and restores one
/// - writes a local backup

use std::sync::Arc;
use mhs_collections::core::types::V3DBundle;
use mhs_collections::progress::{Progress, ProgressState};
use mhs_collections::sort::{SortDirection, SortField};
use mhs_collections::time::{parse_search_string, parse_syntax};
use mhs_collections::transport::{FileTransport, Transport};
use mhs_collections::{Artifact, CatalogSession, Config, SearchField, StringField, TimeField};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║   MHS Collections - Catalog Walkthrough       ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let root = std::env::temp_dir().join("mhs-collections-demo");
    std::fs::create_dir_all(&root)?;

    // Step 1: Open the session
    println!("Step 1: Opening catalog at {}", root.display());
    let config = Config {
        editor_name: "demo".to_string(),
        local_backup_dir: root.join("backups"),
        archive_limit: Some(5),
        ..Config::default()
    };
    let transport: Arc<dyn Transport> = Arc::new(FileTransport::new(&root));
    let session = CatalogSession::open(config, transport, Progress::none())?;
    session.ensure_dirs()?;
    let db = session.database();
    println!("  {} artifacts loaded\n", db.size());

    // Step 2: Add artifacts
    println!("Step 2: Adding artifacts...");
    let photo = Artifact::new("1998.004.2", "Old Barn Photo", parse_syntax("%Y|1920=circa 1920")?, parse_syntax("Mar 01, 1998")?)
        .with_donor("H. Souza")
        .with_medium("Silver gelatin print");
    db.add_or_overwrite(photo)?;

    let mut churn = Artifact::new("1998.004.1", "Butter churn", parse_syntax("%Y|1880-1900")?, parse_syntax("Mar 01, 1998")?)
        .with_medium("Oak");
    churn.configure_3d(V3DBundle::new("front.jpg", "right.jpg", "back.jpg", "left.jpg")?.with_top_only("top.jpg"));
    db.add_or_overwrite(churn)?;

    db.add_or_overwrite(Artifact::new("2003.117.9", "Town Map", parse_syntax("%Y|1905")?, parse_syntax("Jun 12, 2003")?))?;

    match db.add(Artifact::new("2003.117.9", "Duplicate map", parse_syntax("%Y|1905")?, parse_syntax("Jun 12, 2003")?)) {
        Err(e) if e.is_duplicate() => println!("  Duplicate rejected: {}", e),
        other => println!("  Unexpected: {:?}", other),
    }
    println!("  {} artifacts\n", db.size());

    // Step 3: Search
    println!("Step 3: Searching...");
    for hit in db.search_text(SearchField::Text(StringField::Title), "the barn") {
        println!("  title 'the barn' -> {} {}", hit.accession_number, hit.title);
    }
    if let Some(range) = parse_search_string("1870 - 1910") {
        println!("  parsed range: {}", range);
    }
    for hit in db.search_text(SearchField::Time(TimeField::ObjectDate), "1870 - 1910") {
        println!("  object date 1870-1910 -> {} ({})", hit.accession_number, hit.object_date);
    }
    for hit in db.search_text(SearchField::Time(TimeField::ObjectDate), "circa") {
        println!("  object date 'circa' -> {} ({})", hit.accession_number, hit.object_date);
    }
    println!();

    // Step 4: Sort
    println!("Step 4: Sorting by object date, newest first...");
    for artifact in db.sorted(SortField::ObjectDate, SortDirection::Reverse) {
        println!("  {} {}", artifact.object_date, artifact.title);
    }
    println!();

    // Step 5: Sync
    println!("Step 5: Syncing...");
    let progress = ProgressState::new();
    let report = session.sync(Progress::new(Some(&progress)))?;
    for note in progress.notes() {
        println!("  {}", note);
    }
    println!("  {} bytes -> {}\n", report.bytes, report.archive_path);

    // Step 6: Archives
    println!("Step 6: Archives...");
    let archives = session.list_archives()?;
    for entry in &archives {
        println!("  {} ({})", entry.name, entry.created);
    }
    if let Some(oldest) = archives.last() {
        let report = session.restore_archive(oldest, Progress::none())?;
        println!("  Restored {} as {}", oldest.name, report.archive_path);
    }
    println!();

    // Step 7: Local backup and stats
    println!("Step 7: Local backup...");
    let path = session.write_local_backup()?;
    println!("  Wrote {}", path.display());

    let stats = db.stats();
    println!("\nStatistics:");
    println!("  Records:   {}", stats.record_count);
    println!("  3D:        {}", stats.three_d_count);
    println!("  Resources: {}", stats.resource_count);
    println!("  Editor:    {}", stats.editor_label());
    if let Some(last_sync) = stats.last_sync {
        println!("  Last sync: {}", last_sync);
    }

    Ok(())
}
