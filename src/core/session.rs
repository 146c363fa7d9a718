use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use crate::core::config::Config;
use crate::core::database::{Database, SyncReport};
use crate::core::error::{Error, ErrorKind, Result};
use crate::progress::{Progress, ProgressSink};
use crate::storage::archive::{self, ArchiveEntry, LocalBackup};
use crate::transport::Transport;

/// A database bound to its transport and configuration.
///
/// Cloning is cheap; clones share the same database.
#[derive(Clone)]
pub struct CatalogSession {
    config: Config,
    transport: Arc<dyn Transport>,
    database: Arc<Database>,
}

impl CatalogSession {
    /// Load the canonical store (empty if there is none yet)
    pub fn open(config: Config, transport: Arc<dyn Transport>, progress: Progress) -> Result<Self> {
        config.validate()?;
        let database = Database::load(transport.as_ref(), &config.layout(), &config.store_options(), progress)?;
        Ok(CatalogSession {
            config,
            transport,
            database: Arc::new(database),
        })
    }

    /// `open` on tokio's blocking pool
    pub async fn load_in_background(
        config: Config,
        transport: Arc<dyn Transport>,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            CatalogSession::open(config, transport, Progress::new(sink.as_deref()))
        })
        .await
        .map_err(join_error)?
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Create the store, archive and resource directories
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.config.store_dir, &self.config.archive_dir, &self.config.resource_dir] {
            if !self.transport.exists(dir) {
                self.transport.create_dir(dir)?;
                info!(dir = %dir, "created directory");
            }
        }
        Ok(())
    }

    /// Publish the database, then prune archives beyond the configured limit.
    /// Pruning failures are logged, not returned.
    pub fn sync(&self, progress: Progress) -> Result<SyncReport> {
        let report = self.database.sync(
            self.transport.as_ref(),
            &self.config.layout(),
            &self.config.editor_name,
            &self.config.store_options(),
            progress,
        )?;

        if let Some(limit) = self.config.archive_limit {
            if let Err(e) = archive::enforce_archive_limit(self.transport.as_ref(), &self.config.archive_dir, limit) {
                warn!(error = %e, "archive pruning failed");
            }
        }
        Ok(report)
    }

    /// `sync` on tokio's blocking pool
    pub async fn sync_in_background(&self, sink: Option<Arc<dyn ProgressSink>>) -> Result<SyncReport> {
        let session = self.clone();
        tokio::task::spawn_blocking(move || session.sync(Progress::new(sink.as_deref())))
            .await
            .map_err(join_error)?
    }

    /// Swap in the current canonical store
    pub fn reload(&self, progress: Progress) -> Result<()> {
        self.database.reload(
            self.transport.as_ref(),
            &self.config.layout(),
            &self.config.store_options(),
            progress,
        )
    }

    pub fn write_local_backup(&self) -> Result<PathBuf> {
        self.database.write_local(&self.config.local_backup_dir, &self.config.store_options())
    }

    pub fn list_archives(&self) -> Result<Vec<ArchiveEntry>> {
        archive::list_archives(self.transport.as_ref(), &self.config.archive_dir)
    }

    pub fn list_local_backups(&self) -> Result<Vec<LocalBackup>> {
        archive::list_local_backups(&self.config.local_backup_dir)
    }

    /// Make an archive current again. The restore is itself synced, so it
    /// gets its own archive.
    pub fn restore_archive(&self, entry: &ArchiveEntry, progress: Progress) -> Result<SyncReport> {
        let restored = archive::restore_archive(
            self.transport.as_ref(),
            entry,
            &self.config.store_options(),
            progress,
        )?;
        self.database.adopt(restored);
        self.sync(progress)
    }

    /// Publish a local backup as the current store
    pub fn restore_local(&self, path: &Path, progress: Progress) -> Result<SyncReport> {
        info!(path = %path.display(), "restoring local backup");
        let restored = Database::open_local(path)?;
        self.database.adopt(restored);
        self.sync(progress)
    }
}

fn join_error(err: tokio::task::JoinError) -> Error {
    Error::new(ErrorKind::InvalidState, format!("background task failed: {}", err))
}
