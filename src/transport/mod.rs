//! Byte-stream transports the store reads from and publishes to.
//!
//! Paths are `/` separated and relative to the transport's root. A transport
//! serializes its own underlying operations; callers may share one instance
//! between threads.

pub mod file;
pub mod memory;

use std::io::{Read, Write};
use chrono::{DateTime, Utc};
use crate::core::error::Result;

pub use file::FileTransport;
pub use memory::MemoryTransport;

pub trait Transport: Send + Sync {
    fn protocol_name(&self) -> &str;

    fn is_available(&self) -> bool;

    fn exists(&self, name: &str) -> bool;

    /// Size in bytes, `None` if the file is missing
    fn size_of(&self, name: &str) -> Option<u64>;

    fn open_read(&self, name: &str) -> Result<Box<dyn Read + Send>>;

    /// Create or truncate `name`. Data is complete once the writer is flushed
    /// and dropped.
    fn open_write(&self, name: &str) -> Result<Box<dyn Write + Send>>;

    /// Move `from` over `to`, replacing it
    fn rename(&self, from: &str, to: &str) -> Result<()>;

    fn delete(&self, name: &str) -> bool;

    /// Names (not paths) of the files directly inside `dir`
    fn list(&self, dir: &str) -> Result<Vec<String>>;

    fn last_modified(&self, name: &str) -> Result<DateTime<Utc>>;

    fn create_dir(&self, dir: &str) -> Result<()>;
}

/// Join transport path segments with a single `/`
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::join;

    #[test]
    fn join_avoids_double_slashes() {
        assert_eq!(join("database/", "/database.store"), "database/database.store");
        assert_eq!(join("", "database.store"), "database.store");
    }
}
