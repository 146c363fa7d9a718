use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};
use crate::compression::compress::{CompressionType, MAX_PRACTICAL_ZSTD_LEVEL};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::StoreStats;
use crate::core::types::{Artifact, SearchField, StringField, TimeField};
use crate::progress::{copy_monitored, Progress};
use crate::search::results::{into_artifacts, rank};
use crate::search::{StringCrawler, TextSource, TimeCrawler};
use crate::sort::{ArtifactSorter, SortDirection, SortField};
use crate::storage::container;
use crate::storage::layout::{self, StoreLayout};
use crate::time::parse_search_string;
use crate::transport::Transport;

/// Timestamp of a store that was never synced
pub const NEVER_SYNCED: i64 = -1;

/// Framing and transfer settings for store files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub chunk_size: usize,
    pub compression: CompressionType,
    pub compression_level: i32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            chunk_size: 5120,
            compression: CompressionType::Zstd,
            compression_level: MAX_PRACTICAL_ZSTD_LEVEL,
        }
    }
}

/// Everything a store file holds
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreImage {
    records: Vec<Artifact>,
    timestamp: i64,              // Epoch millis of the last sync, -1 if never
    last_editor: Option<String>,
}

impl Default for StoreImage {
    fn default() -> Self {
        StoreImage {
            records: Vec::new(),
            timestamp: NEVER_SYNCED,
            last_editor: None,
        }
    }
}

/// Outcome of a successful sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub millis: i64,
    pub canonical_path: String,
    pub archive_path: String,
    pub bytes: usize,
}

/// The artifact collection and its publication metadata.
///
/// All collection access goes through one lock. Readers get copies, and the
/// lock is never held during transport I/O.
#[derive(Debug, Default)]
pub struct Database {
    state: RwLock<StoreImage>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_image(image: StoreImage) -> Self {
        Database {
            state: RwLock::new(image),
        }
    }

    /// Download the canonical store. No store file yet means an empty database.
    pub fn load(
        transport: &dyn Transport,
        layout: &StoreLayout,
        options: &StoreOptions,
        progress: Progress,
    ) -> Result<Self> {
        Ok(Self::from_image(read_canonical(transport, layout, options, progress)?))
    }

    /// Download a specific store file, e.g. an archive
    pub fn load_from(
        transport: &dyn Transport,
        path: &str,
        options: &StoreOptions,
        progress: Progress,
    ) -> Result<Self> {
        ensure_available(transport)?;
        if !transport.exists(path) {
            return Err(Error::new(ErrorKind::NotFound, format!("store file '{}' does not exist", path)));
        }
        Ok(Self::from_image(read_store(transport, path, options, progress)?))
    }

    /// Re-download the canonical store and swap it in, in one step
    pub fn reload(
        &self,
        transport: &dyn Transport,
        layout: &StoreLayout,
        options: &StoreOptions,
        progress: Progress,
    ) -> Result<()> {
        let image = read_canonical(transport, layout, options, progress)?;
        let count = image.records.len();
        *self.state.write() = image;
        info!(records = count, "reloaded database");
        Ok(())
    }

    /// Replace this database's contents with `other`'s
    pub fn adopt(&self, other: Database) {
        let image = other.state.into_inner();
        *self.state.write() = image;
    }

    /// Decode store-file bytes: container, then snapshot, then re-sort
    pub fn from_store_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_image(decode_image(bytes)?))
    }

    /// Read a store file written by `write_local`
    pub fn open_local(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            Error::new(ErrorKind::Io, format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_store_bytes(&bytes)
    }

    /// Publish the database.
    ///
    /// Stamps time and editor, frames the whole database once, uploads it to a
    /// temporary name and renames that over the canonical file, then uploads the
    /// same bytes as a new archive. An archive failure after the rename leaves
    /// the canonical store updated and returns `ArchiveIncomplete`.
    pub fn sync(
        &self,
        transport: &dyn Transport,
        layout: &StoreLayout,
        editor: &str,
        options: &StoreOptions,
        progress: Progress,
    ) -> Result<SyncReport> {
        ensure_available(transport)?;

        let (millis, payload) = self.stamp(transport, layout, editor)?;
        debug!(millis, "stamped database");

        progress.note("Compressing database... Please wait");
        let bytes = container::encode(
            &layout::entry_name(millis),
            &payload,
            options.compression,
            options.compression_level,
        )?;

        progress.note("Uploading database store-file...");
        let canonical_path = layout.canonical_path();
        let temp_path = layout.temp_path(millis);
        let published = upload(transport, &temp_path, &bytes, options, progress, "upload")
            .and_then(|_| transport.rename(&temp_path, &canonical_path));
        if let Err(e) = published {
            if transport.exists(&temp_path) && !transport.delete(&temp_path) {
                warn!(path = %temp_path, "could not remove temporary store file");
            }
            return Err(e);
        }
        debug!(path = %canonical_path, bytes = bytes.len(), "canonical store replaced");

        progress.note("Archiving database store-file...");
        let archive_path = layout.archive_path(millis);
        if let Err(e) = upload(transport, &archive_path, &bytes, options, progress, "archive") {
            if transport.exists(&archive_path) && !transport.delete(&archive_path) {
                warn!(path = %archive_path, "could not remove partial archive");
            }
            return Err(Error::new(
                ErrorKind::ArchiveIncomplete,
                format!("store published but archive '{}' failed: {}", archive_path, e),
            ));
        }

        info!(millis, archive = %archive_path, bytes = bytes.len(), "database synced");
        Ok(SyncReport {
            millis,
            canonical_path,
            archive_path,
            bytes: bytes.len(),
        })
    }

    /// Write a `<millis>.store` backup into `dir` without touching the stamp
    pub fn write_local(&self, dir: &Path, options: &StoreOptions) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let mut millis = Utc::now().timestamp_millis();
        while dir.join(layout::local_backup_name(millis)).exists() {
            millis += 1;
        }
        let path = dir.join(layout::local_backup_name(millis));
        let bytes = self.encode(&layout::entry_name(millis), options)?;

        write_atomically(&path, &bytes)?;

        info!(path = %path.display(), bytes = bytes.len(), "wrote local backup");
        Ok(path)
    }

    /// Add a new artifact; fails with `DuplicateKey` if its accession number exists
    pub fn add(&self, artifact: Artifact) -> Result<()> {
        validate_key(&artifact)?;
        let mut state = self.state.write();
        if find_index(&state.records, &artifact.accession_number).is_some() {
            return Err(Error::duplicate(&artifact.accession_number));
        }
        state.records.push(artifact);
        Ok(())
    }

    /// Add or replace by accession number. Returns true if a record was replaced.
    pub fn add_or_overwrite(&self, artifact: Artifact) -> Result<bool> {
        validate_key(&artifact)?;
        let mut state = self.state.write();
        match find_index(&state.records, &artifact.accession_number) {
            Some(index) => {
                state.records[index] = artifact;
                Ok(true)
            }
            None => {
                state.records.push(artifact);
                Ok(false)
            }
        }
    }

    pub fn remove(&self, artifact: &Artifact) -> bool {
        self.remove_by_accession(&artifact.accession_number)
    }

    pub fn remove_by_accession(&self, accession_number: &str) -> bool {
        let mut state = self.state.write();
        match find_index(&state.records, accession_number) {
            Some(index) => {
                state.records.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Relevance search on one field of `query`, most relevant first.
    /// Time fields use exact-range matching.
    pub fn search(&self, field: SearchField, query: &Artifact) -> Vec<Artifact> {
        let state = self.state.read();
        let hits = match field {
            SearchField::Text(field) => {
                rank(&state.records, &StringCrawler::new(TextSource::Field(field), query.string_field(field)))
            }
            SearchField::Time(field) => {
                rank(&state.records, &TimeCrawler::new(field, query.time_field(field).clone()))
            }
        };
        into_artifacts(hits)
    }

    pub fn search_string(&self, field: StringField, query: &Artifact) -> Vec<Artifact> {
        self.search(SearchField::Text(field), query)
    }

    pub fn search_time(&self, field: TimeField, query: &Artifact) -> Vec<Artifact> {
        self.search(SearchField::Time(field), query)
    }

    /// String search over the rendered dates, for date text that did not parse
    pub fn search_hybrid(&self, field: TimeField, query: &Artifact) -> Vec<Artifact> {
        let text = query.time_field(field).to_string();
        let crawler = StringCrawler::new(TextSource::RenderedTime(field), &text);
        into_artifacts(rank(&self.state.read().records, &crawler))
    }

    /// Search with raw search-box text. Date text that parses is matched as a
    /// date or range; anything else falls back to hybrid search.
    pub fn search_text(&self, field: SearchField, text: &str) -> Vec<Artifact> {
        match field {
            SearchField::Text(_) => self.search(field, &Artifact::query(field, text)),
            SearchField::Time(time_field) => match parse_search_string(text) {
                Some(time) => {
                    let mut query = Artifact::generic();
                    *query.time_field_mut(time_field) = time;
                    self.search(field, &query)
                }
                None => {
                    debug!(text, "date did not parse, using hybrid search");
                    self.search_hybrid(time_field, &Artifact::query(field, text))
                }
            },
        }
    }

    /// Reorder the collection in place
    pub fn sort(&self, field: SortField, direction: SortDirection) {
        let sorter = ArtifactSorter::new(field, direction);
        sorter.sort(&mut self.state.write().records);
    }

    /// Sorted copy; the collection keeps its order
    pub fn sorted(&self, field: SortField, direction: SortDirection) -> Vec<Artifact> {
        let mut records = self.snapshot();
        ArtifactSorter::new(field, direction).sort(&mut records);
        records
    }

    pub fn size(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Copy of every record
    pub fn snapshot(&self) -> Vec<Artifact> {
        self.state.read().records.clone()
    }

    pub fn get(&self, accession_number: &str) -> Option<Artifact> {
        let state = self.state.read();
        find_index(&state.records, accession_number).map(|index| state.records[index].clone())
    }

    pub fn contains(&self, accession_number: &str) -> bool {
        find_index(&self.state.read().records, accession_number).is_some()
    }

    /// Time of the last sync
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.state.read().timestamp {
            NEVER_SYNCED => None,
            millis => layout::millis_to_datetime(millis),
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.state.read().timestamp
    }

    pub fn last_editor(&self) -> Option<String> {
        self.state.read().last_editor.clone()
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            record_count: state.records.len(),
            three_d_count: state.records.iter().filter(|a| a.is_3d_supported()).count(),
            resource_count: state.records.iter().map(|a| a.resource_names().len()).sum(),
            last_sync: match state.timestamp {
                NEVER_SYNCED => None,
                millis => layout::millis_to_datetime(millis),
            },
            last_editor: state.last_editor.clone(),
        }
    }

    /// Pick a sync time later than the last one whose archive name is free,
    /// record it with the editor and serialize the stamped image under the
    /// same guard.
    fn stamp(&self, transport: &dyn Transport, layout: &StoreLayout, editor: &str) -> Result<(i64, Vec<u8>)> {
        let editor = editor.trim();
        let mut millis = Utc::now().timestamp_millis().max(self.state.read().timestamp + 1);
        loop {
            while transport.exists(&layout.archive_path(millis)) {
                millis += 1;
            }

            let mut state = self.state.write();
            if millis <= state.timestamp {
                // Another sync stamped meanwhile; its archive name may be taken
                millis = state.timestamp + 1;
                continue;
            }
            state.timestamp = millis;
            state.last_editor = (!editor.is_empty()).then(|| editor.to_string());

            let state = RwLockWriteGuard::downgrade(state);
            let payload = bincode::serialize(&*state)?;
            return Ok((millis, payload));
        }
    }

    fn encode(&self, entry_name: &str, options: &StoreOptions) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&*self.state.read())?;
        container::encode(entry_name, &payload, options.compression, options.compression_level)
    }
}

/// Write `bytes` to a `.partial` sibling and rename it over `path`. The
/// partial file is removed if any step fails.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let partial = path.with_extension("store.partial");
    let written = fs::File::create(&partial)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&partial, path));

    if let Err(e) = written {
        if partial.exists() {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!(path = %partial.display(), error = %cleanup, "could not remove partial backup");
            }
        }
        return Err(Error::new(ErrorKind::Io, format!("cannot write '{}': {}", path.display(), e)));
    }
    Ok(())
}

fn ensure_available(transport: &dyn Transport) -> Result<()> {
    if !transport.is_available() {
        return Err(Error::new(
            ErrorKind::TransportUnavailable,
            format!("{} transport is not available", transport.protocol_name()),
        ));
    }
    Ok(())
}

fn validate_key(artifact: &Artifact) -> Result<()> {
    if artifact.accession_number.trim().is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            "artifact has no accession number".to_string(),
        ));
    }
    Ok(())
}

/// Position of `accession_number` in `records`, found by binary search over a
/// freshly sorted key list
fn find_index(records: &[Artifact], accession_number: &str) -> Option<usize> {
    let mut keys: Vec<(&str, usize)> = records
        .iter()
        .enumerate()
        .map(|(index, artifact)| (artifact.accession_number.as_str(), index))
        .collect();
    keys.sort_unstable();

    keys.binary_search_by(|(key, _)| (*key).cmp(accession_number))
        .ok()
        .map(|position| keys[position].1)
}

fn read_canonical(
    transport: &dyn Transport,
    layout: &StoreLayout,
    options: &StoreOptions,
    progress: Progress,
) -> Result<StoreImage> {
    ensure_available(transport)?;
    let path = layout.canonical_path();
    if !transport.exists(&path) {
        info!(path = %path, "no store file yet, starting empty");
        return Ok(StoreImage::default());
    }
    read_store(transport, &path, options, progress)
}

fn read_store(
    transport: &dyn Transport,
    path: &str,
    options: &StoreOptions,
    progress: Progress,
) -> Result<StoreImage> {
    progress.note("Downloading database store-file...");
    let total = transport.size_of(path);
    let mut reader = transport.open_read(path)?;
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    copy_monitored(&mut *reader, &mut bytes, total, options.chunk_size, progress, "download")?;
    debug!(path, bytes = bytes.len(), "downloaded store file");

    progress.note("Extracting database...");
    let image = decode_image(&bytes)?;
    info!(path, records = image.records.len(), "loaded database");
    Ok(image)
}

fn decode_image(bytes: &[u8]) -> Result<StoreImage> {
    let entry = container::decode(bytes)?;
    let mut image: StoreImage = bincode::deserialize(&entry.payload).map_err(|e| {
        Error::new(ErrorKind::Deserialization, format!("entry '{}': {}", entry.name, e))
    })?;
    image.records.sort_by(|a, b| a.accession_number.cmp(&b.accession_number));
    Ok(image)
}

fn upload(
    transport: &dyn Transport,
    path: &str,
    bytes: &[u8],
    options: &StoreOptions,
    progress: Progress,
    what: &str,
) -> Result<()> {
    let mut writer = transport.open_write(path)?;
    let mut reader = Cursor::new(bytes);
    copy_monitored(&mut reader, &mut *writer, Some(bytes.len() as u64), options.chunk_size, progress, what)?;
    Ok(())
}
