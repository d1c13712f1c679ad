//! Sink: a named output with its own level threshold and pipeline

use super::appender::Appender;
use super::error::{LoggerError, Result};
use super::level_registry::LevelRegistry;
use super::log_entry::LogEntry;
use super::pipeline::{Pipeline, StageOutcome};
use parking_lot::Mutex;
use std::fmt;

/// Named output target
///
/// The threshold is checked before the sink's pipeline runs, so a sink that
/// rejects a level does no formatting work for it.
pub struct Sink {
    name: String,
    min_level: String,
    pipeline: Pipeline,
    appender: Mutex<Box<dyn Appender>>,
}

impl Sink {
    pub fn new(
        name: impl Into<String>,
        min_level: impl Into<String>,
        pipeline: Pipeline,
        appender: Box<dyn Appender>,
    ) -> Self {
        Self {
            name: name.into(),
            min_level: min_level.into(),
            pipeline,
            appender: Mutex::new(appender),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> &str {
        &self.min_level
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Whether an entry at `level` passes this sink's threshold
    pub fn accepts(&self, registry: &LevelRegistry, level: &str) -> Result<bool> {
        Ok(registry.priority(level)? <= registry.priority(&self.min_level)?)
    }

    /// Run the sink pipeline on `entry`
    pub fn format(&self, entry: LogEntry) -> StageOutcome {
        self.pipeline.run(entry)
    }

    /// Hand a rendered entry to the appender, one record per line
    pub fn write(&self, entry: &LogEntry) -> Result<()> {
        let rendered = entry.rendered().ok_or_else(|| {
            LoggerError::sink_write(&self.name, "entry reached the sink without being serialized")
        })?;

        let mut record = Vec::with_capacity(rendered.len() + 1);
        record.extend_from_slice(rendered.as_bytes());
        record.push(b'\n');

        self.appender
            .lock()
            .write(&record)
            .map_err(|e| LoggerError::sink_write(&self.name, e.to_string()))
    }

    pub fn flush(&self) -> Result<()> {
        self.appender
            .lock()
            .flush()
            .map_err(|e| LoggerError::sink_write(&self.name, e.to_string()))
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
