use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use crate::compression::compress::{CompressionType, MAX_PRACTICAL_ZSTD_LEVEL};
use crate::core::database::StoreOptions;
use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::layout::StoreLayout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Transport paths
    pub store_dir: String,
    pub archive_dir: String,
    pub resource_dir: String,

    pub local_backup_dir: PathBuf,
    pub editor_name: String,
    pub archive_limit: Option<usize>,    // None keeps every archive

    // Store file framing
    pub transfer_chunk_size: usize,
    pub compression: CompressionType,
    pub compression_level: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_dir: "database".to_string(),
            archive_dir: "database/archives".to_string(),
            resource_dir: "rsc".to_string(),
            local_backup_dir: PathBuf::from("./backups"),
            editor_name: String::new(),
            archive_limit: None,
            transfer_chunk_size: 5120,
            compression: CompressionType::Zstd,
            compression_level: MAX_PRACTICAL_ZSTD_LEVEL,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Io, format!("cannot read config '{}': {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.store_dir.trim().is_empty() || self.archive_dir.trim().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "store and archive directories must be set".to_string(),
            ));
        }
        if self.transfer_chunk_size == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "transfer chunk size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            chunk_size: self.transfer_chunk_size,
            compression: self.compression,
            compression_level: self.compression_level,
        }
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(&self.store_dir, &self.archive_dir)
    }
}
