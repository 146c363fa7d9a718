use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use crate::core::error::{Error, ErrorKind, Result};
use crate::transport::Transport;

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

#[derive(Debug)]
struct MemoryFs {
    files: BTreeMap<String, MemoryFile>,
    dirs: BTreeSet<String>,
    available: bool,
    failing_prefixes: Vec<String>,
}

/// In-process transport. Clones share the same files, so several "clients"
/// can talk to one remote.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    fs: Arc<Mutex<MemoryFs>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        MemoryTransport {
            fs: Arc::new(Mutex::new(MemoryFs {
                files: BTreeMap::new(),
                dirs: BTreeSet::new(),
                available: true,
                failing_prefixes: Vec::new(),
            })),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.fs.lock().available = available;
    }

    /// Make every later `open_write` under `prefix` fail
    pub fn fail_writes_under(&self, prefix: &str) {
        self.fs.lock().failing_prefixes.push(normalize(prefix));
    }

    pub fn clear_failures(&self) {
        self.fs.lock().failing_prefixes.clear();
    }

    pub fn put(&self, name: &str, data: Vec<u8>) {
        self.fs.lock().files.insert(normalize(name), MemoryFile {
            data,
            modified: Utc::now(),
        });
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.fs.lock().files.get(&normalize(name)).map(|file| file.data.clone())
    }

    /// Every file path, sorted
    pub fn paths(&self) -> Vec<String> {
        self.fs.lock().files.keys().cloned().collect()
    }
}

fn normalize(name: &str) -> String {
    name.split('/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

struct MemoryWriter {
    fs: Arc<Mutex<MemoryFs>>,
    name: String,
    buffer: Vec<u8>,
}

impl MemoryWriter {
    fn commit(&self) {
        let mut fs = self.fs.lock();
        fs.files.insert(self.name.clone(), MemoryFile {
            data: self.buffer.clone(),
            modified: Utc::now(),
        });
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

impl Transport for MemoryTransport {
    fn protocol_name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        self.fs.lock().available
    }

    fn exists(&self, name: &str) -> bool {
        let name = normalize(name);
        let fs = self.fs.lock();
        let dir_prefix = format!("{}/", name);
        fs.files.contains_key(&name)
            || fs.dirs.contains(&name)
            || fs.files.keys().any(|path| path.starts_with(dir_prefix.as_str()))
    }

    fn size_of(&self, name: &str) -> Option<u64> {
        self.fs.lock().files.get(&normalize(name)).map(|file| file.data.len() as u64)
    }

    fn open_read(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let data = self.get(name).ok_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("'{}' does not exist", name))
        })?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn open_write(&self, name: &str) -> Result<Box<dyn Write + Send>> {
        let name = normalize(name);
        {
            let mut fs = self.fs.lock();
            if !fs.available {
                return Err(Error::new(ErrorKind::TransportUnavailable, "memory transport offline".to_string()));
            }
            if fs.failing_prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())) {
                return Err(Error::new(ErrorKind::Io, format!("write to '{}' refused", name)));
            }
            fs.files.insert(name.clone(), MemoryFile {
                data: Vec::new(),
                modified: Utc::now(),
            });
        }

        Ok(Box::new(MemoryWriter {
            fs: self.fs.clone(),
            name,
            buffer: Vec::new(),
        }))
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut fs = self.fs.lock();
        let file = fs.files.remove(&normalize(from)).ok_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("'{}' does not exist", from))
        })?;
        fs.files.insert(normalize(to), file);
        Ok(())
    }

    fn delete(&self, name: &str) -> bool {
        self.fs.lock().files.remove(&normalize(name)).is_some()
    }

    fn list(&self, dir: &str) -> Result<Vec<String>> {
        let dir = normalize(dir);
        let prefix = if dir.is_empty() { String::new() } else { format!("{}/", dir) };

        Ok(self.fs.lock()
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.contains('/'))
            .map(String::from)
            .collect())
    }

    fn last_modified(&self, name: &str) -> Result<DateTime<Utc>> {
        self.fs.lock()
            .files
            .get(&normalize(name))
            .map(|file| file.modified)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("'{}' does not exist", name)))
    }

    fn create_dir(&self, dir: &str) -> Result<()> {
        let mut fs = self.fs.lock();
        let mut path = String::new();
        for part in normalize(dir).split('/').filter(|p| !p.is_empty()) {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(part);
            fs.dirs.insert(path.clone());
        }
        Ok(())
    }
}
