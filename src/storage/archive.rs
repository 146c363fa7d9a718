use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use crate::core::database::{Database, StoreOptions};
use crate::core::error::Result;
use crate::progress::Progress;
use crate::storage::layout::{self, parse_archive_name, parse_local_backup_name};
use crate::transport::{join, Transport};

/// Timestamped store copy in the archive directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: String,
    pub millis: i64,
    pub created: DateTime<Utc>,
}

/// Store file written by `Database::write_local`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBackup {
    pub path: PathBuf,
    pub millis: i64,
    pub created: DateTime<Utc>,
}

/// Archives in `archive_dir`, newest first. Names that are not
/// `<millis>_database.store` are skipped.
pub fn list_archives(transport: &dyn Transport, archive_dir: &str) -> Result<Vec<ArchiveEntry>> {
    let mut entries: Vec<ArchiveEntry> = transport
        .list(archive_dir)?
        .into_iter()
        .filter_map(|name| {
            let Some(millis) = parse_archive_name(&name) else {
                if !layout::is_temp_name(&name) {
                    warn!(name = %name, "skipping unrecognised file in archive directory");
                }
                return None;
            };
            let created = layout::millis_to_datetime(millis)?;
            Some(ArchiveEntry {
                path: join(archive_dir, &name),
                name,
                millis,
                created,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.millis.cmp(&a.millis));
    Ok(entries)
}

/// Delete the oldest archives until at most `limit` remain. Returns how many
/// were deleted.
pub fn enforce_archive_limit(transport: &dyn Transport, archive_dir: &str, limit: usize) -> Result<usize> {
    let entries = list_archives(transport, archive_dir)?;
    let mut deleted = 0;

    for entry in entries.iter().skip(limit) {
        if transport.delete(&entry.path) {
            deleted += 1;
        } else {
            warn!(path = %entry.path, "could not delete archive");
        }
    }

    if deleted > 0 {
        info!(deleted, limit, "pruned archives");
    }
    Ok(deleted)
}

/// Read an archived store back into memory. Publishing it again is up to the
/// caller.
pub fn restore_archive(
    transport: &dyn Transport,
    entry: &ArchiveEntry,
    options: &StoreOptions,
    progress: Progress,
) -> Result<Database> {
    info!(archive = %entry.name, "restoring archive");
    Database::load_from(transport, &entry.path, options, progress)
}

/// Local backups in `dir`, newest first. A missing directory has none.
pub fn list_local_backups(dir: &Path) -> Result<Vec<LocalBackup>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut backups = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(millis) = parse_local_backup_name(&name) else {
            continue;
        };
        let Some(created) = layout::millis_to_datetime(millis) else {
            continue;
        };
        backups.push(LocalBackup {
            path: entry.path(),
            millis,
            created,
        });
    }

    backups.sort_by(|a, b| b.millis.cmp(&a.millis));
    Ok(backups)
}
