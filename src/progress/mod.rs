use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use parking_lot::Mutex;
use crate::core::error::{Error, Result};

/// Receiver of progress updates from long-running store operations
pub trait ProgressSink: Send + Sync {
    fn set_note(&self, note: &str);

    /// Always called with a value in 0..=100
    fn set_progress(&self, percent: u8);

    fn is_canceled(&self) -> bool {
        false
    }
}

/// Optional sink handle. Every call is a no-op without a sink.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    sink: Option<&'a dyn ProgressSink>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: Option<&'a dyn ProgressSink>) -> Self {
        Progress { sink }
    }

    pub fn none() -> Self {
        Progress { sink: None }
    }

    pub fn note(&self, text: &str) {
        if let Some(sink) = self.sink {
            sink.set_note(text);
        }
    }

    pub fn percent(&self, percent: u64) {
        if let Some(sink) = self.sink {
            sink.set_progress(percent.min(100) as u8);
        }
    }

    pub fn report(&self, done: u64, total: u64) {
        if total == 0 {
            self.percent(100);
        } else {
            self.percent((done.saturating_mul(100) + total / 2) / total);
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.sink.is_some_and(|sink| sink.is_canceled())
    }

    pub fn check_cancel(&self, what: &str) -> Result<()> {
        if self.is_canceled() {
            return Err(Error::cancelled(what));
        }
        Ok(())
    }
}

/// Copy `reader` into `writer` in chunks, reporting progress against `total`
/// and checking for cancellation before every chunk. Returns bytes copied.
pub fn copy_monitored<R, W>(
    reader: &mut R,
    writer: &mut W,
    total: Option<u64>,
    chunk_size: usize,
    progress: Progress,
    what: &str,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut done = 0u64;

    loop {
        progress.check_cancel(what)?;

        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        writer.write_all(&buffer[..n])?;
        done += n as u64;

        if let Some(total) = total {
            progress.report(done, total);
        }
    }

    writer.flush()?;
    progress.percent(100);
    Ok(done)
}

/// Thread-safe sink that records what it was told; callers poll it or cancel it
#[derive(Debug, Default)]
pub struct ProgressState {
    percent: AtomicU8,
    canceled: AtomicBool,
    notes: Mutex<Vec<String>>,
    cancel_on_note: Mutex<Option<String>>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Cancel as soon as a note starting with `prefix` arrives
    pub fn cancel_on_note(&self, prefix: &str) {
        *self.cancel_on_note.lock() = Some(prefix.to_string());
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::SeqCst)
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().clone()
    }
}

impl ProgressSink for ProgressState {
    fn set_note(&self, note: &str) {
        if let Some(prefix) = self.cancel_on_note.lock().as_deref() {
            if note.starts_with(prefix) {
                self.cancel();
            }
        }
        self.notes.lock().push(note.to_string());
    }

    fn set_progress(&self, percent: u8) {
        self.percent.store(percent.min(100), Ordering::SeqCst);
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn copy_reports_full_progress() {
        let state = ProgressState::new();
        let data = vec![7u8; 10_000];
        let mut out = Vec::new();
        let n = copy_monitored(&mut &data[..], &mut out, Some(10_000), 512, Progress::new(Some(&state)), "copy").unwrap();
        assert_eq!(n, 10_000);
        assert_eq!(out, data);
        assert_eq!(state.percent(), 100);
    }

    #[test]
    fn copy_stops_when_canceled() {
        let state = ProgressState::new();
        state.cancel();
        let mut out = Vec::new();
        let err = copy_monitored(&mut &b"abc"[..], &mut out, None, 1, Progress::new(Some(&state)), "upload").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cancelled);
        assert!(out.is_empty());
    }

    #[test]
    fn report_is_capped() {
        let state = ProgressState::new();
        Progress::new(Some(&state)).report(500, 100);
        assert_eq!(state.percent(), 100);
        Progress::none().report(1, 2);
    }
}
