use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use crate::core::error::{Error, ErrorKind, Result};
use crate::transport::Transport;

/// Transport over a local (or mounted) directory
#[derive(Debug, Clone)]
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileTransport { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl Transport for FileTransport {
    fn protocol_name(&self) -> &str {
        "file"
    }

    fn is_available(&self) -> bool {
        // Read-only roots are fine; writes fail with `Io` on their own
        fs::read_dir(&self.root).is_ok()
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }

    fn size_of(&self, name: &str) -> Option<u64> {
        fs::metadata(self.resolve(name))
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }

    fn open_read(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let file = File::open(self.resolve(name)).map_err(|e| {
            Error::new(ErrorKind::Io, format!("cannot open '{}': {}", name, e))
        })?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn open_write(&self, name: &str) -> Result<Box<dyn Write + Send>> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::new(ErrorKind::Io, format!("cannot create '{}': {}", name, e)))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from);
        if !source.exists() {
            return Err(Error::new(ErrorKind::NotFound, format!("'{}' does not exist", from)));
        }
        fs::rename(source, self.resolve(to))?;
        Ok(())
    }

    fn delete(&self, name: &str) -> bool {
        fs::remove_file(self.resolve(name)).is_ok()
    }

    fn list(&self, dir: &str) -> Result<Vec<String>> {
        let path = self.resolve(dir);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn last_modified(&self, name: &str) -> Result<DateTime<Utc>> {
        let modified = fs::metadata(self.resolve(name))?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn create_dir(&self, dir: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(dir))?;
        Ok(())
    }
}
