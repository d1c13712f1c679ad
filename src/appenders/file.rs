//! Append-only file appender
//!
//! Records are buffered and written on flush, or when the buffer fills.
//! With the `file` feature each write to disk holds an exclusive advisory
//! lock, so several processes appending to one file never interleave
//! partial records.

use crate::core::{Appender, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file")]
use fs2::FileExt;

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

pub struct FileAppender {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileAppender {
    /// Open `path` for appending, creating it if missing
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use logpipe::appenders::FileAppender;
    ///
    /// let appender = FileAppender::new("combined.log").unwrap();
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_capacity(path, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self {
            name,
            path,
            writer: Some(BufWriter::with_capacity(capacity, file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| LoggerError::sink_write(&self.name, "file writer not initialized"))
    }
}

impl Appender for FileAppender {
    fn write(&mut self, record: &[u8]) -> Result<()> {
        let writer = self.writer()?;
        // Keep each record whole on disk
        if writer.buffer().len() + record.len() > writer.capacity() {
            flush_locked(writer)?;
        }
        if record.len() > writer.capacity() {
            return write_through_locked(writer, record);
        }
        writer.write_all(record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            flush_locked(writer)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(feature = "file")]
fn flush_locked(writer: &mut BufWriter<File>) -> Result<()> {
    if writer.buffer().is_empty() {
        return Ok(());
    }
    writer.get_ref().lock_exclusive()?;
    let flushed = writer.flush();
    let unlocked = writer.get_ref().unlock();
    flushed?;
    unlocked?;
    Ok(())
}

/// Write a record too large for the buffer straight to the file
#[cfg(feature = "file")]
fn write_through_locked(writer: &mut BufWriter<File>, record: &[u8]) -> Result<()> {
    let file = writer.get_mut();
    file.lock_exclusive()?;
    let written = file.write_all(record);
    let unlocked = file.unlock();
    written?;
    unlocked?;
    Ok(())
}

#[cfg(not(feature = "file"))]
fn write_through_locked(writer: &mut BufWriter<File>, record: &[u8]) -> Result<()> {
    writer.get_mut().write_all(record)?;
    Ok(())
}

#[cfg(not(feature = "file"))]
fn flush_locked(writer: &mut BufWriter<File>) -> Result<()> {
    writer.flush()?;
    Ok(())
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush '{}' on drop: {}", self.name, e);
        }
    }
}
