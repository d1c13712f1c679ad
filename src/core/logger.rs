//! Main logger implementation
//!
//! Every emit runs synchronously on the calling thread:
//!
//! 1. build one [`LogEntry`] from the call-site record and the logger's
//!    default fields
//! 2. check the logger threshold
//! 3. run the base pipeline once
//! 4. for each sink: check the sink threshold, run the sink pipeline on a
//!    copy and write the rendered record
//!
//! A stage that asks for a replacement (redaction, promotion) hands the
//! replacement back to this driver, which routes it through the same path
//! exactly once.

use super::{
    error::{LoggerError, Result},
    level_registry::{LevelRegistry, LogLevel},
    log_context::Fields,
    log_entry::{LogEntry, LogRecord},
    metrics::LoggerMetrics,
    pipeline::{Pipeline, StageOutcome},
    sink::Sink,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Label used when none is configured
pub const DEFAULT_LABEL: &str = "Main";

/// What happened to one emit call
///
/// Sink failures never fail the call; they are collected here.
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Names of the sinks that received a record
    pub delivered: Vec<String>,
    /// Per-sink errors, in sink order
    pub failures: Vec<LoggerError>,
}

impl EmitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn delivered_to(&self, sink: &str) -> bool {
        self.delivered.iter().any(|name| name == sink)
    }
}

/// Outcome of one sink's pass
enum Delivery {
    Written,
    Filtered,
    Dropped,
    LoopGuard(String),
}

/// State shared by a logger and all of its children
pub(crate) struct LoggerCore {
    registry: Arc<LevelRegistry>,
    min_level: String,
    base: Pipeline,
    sinks: Vec<Sink>,
    metrics: LoggerMetrics,
    pub(crate) profiles: Mutex<HashMap<String, Instant>>,
}

impl LoggerCore {
    fn dispatch(&self, entry: LogEntry) -> Result<EmitReport> {
        if !self.registry.is_at_least(&entry.level, &self.min_level)? {
            self.metrics.record_suppressed();
            return Ok(EmitReport::default());
        }
        self.metrics.record_emitted();

        match self.base.run(entry) {
            StageOutcome::Continue(entry) => Ok(self.route(&entry)),
            StageOutcome::Drop => {
                self.metrics.record_dropped();
                Ok(EmitReport::default())
            }
            StageOutcome::Replace(replacement) => self.replay(replacement),
        }
    }

    /// Route a replacement through the base pipeline, once
    fn replay(&self, replacement: LogEntry) -> Result<EmitReport> {
        self.metrics.record_replaced();
        let replacement = replacement.into_replayed();

        if !self.registry.is_at_least(&replacement.level, &self.min_level)? {
            self.metrics.record_suppressed();
            return Ok(EmitReport::default());
        }

        match self.base.run(replacement) {
            StageOutcome::Continue(entry) => Ok(self.route(&entry)),
            StageOutcome::Drop => {
                self.metrics.record_dropped();
                Ok(EmitReport::default())
            }
            StageOutcome::Replace(again) => {
                let mut report = EmitReport::default();
                report.failures.push(self.loop_guard(&again.level));
                Ok(report)
            }
        }
    }

    fn route(&self, entry: &LogEntry) -> EmitReport {
        let mut report = EmitReport::default();

        // Per-sink panic isolation: one failing sink never stops the others
        for sink in &self.sinks {
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| self.deliver(sink, entry.clone())));

            match result {
                Ok(Ok(Delivery::Written)) => {
                    self.metrics.record_delivered();
                    report.delivered.push(sink.name().to_string());
                }
                Ok(Ok(Delivery::Filtered)) => {}
                Ok(Ok(Delivery::Dropped)) => {
                    self.metrics.record_dropped();
                }
                Ok(Ok(Delivery::LoopGuard(level))) => {
                    report.failures.push(self.loop_guard(&level));
                }
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                    self.metrics.record_sink_failure();
                    report.failures.push(e);
                }
                Err(panic_info) => {
                    let panic_msg = panic_message(panic_info.as_ref());
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                         Other sinks continue to function.",
                        sink.name(),
                        panic_msg
                    );
                    self.metrics.record_sink_failure();
                    report.failures.push(LoggerError::sink_write(
                        sink.name(),
                        format!("panicked: {}", panic_msg),
                    ));
                }
            }
        }

        report
    }

    fn deliver(&self, sink: &Sink, entry: LogEntry) -> Result<Delivery> {
        if !sink.accepts(&self.registry, &entry.level)? {
            return Ok(Delivery::Filtered);
        }

        let formatted = match sink.format(entry) {
            StageOutcome::Continue(entry) => entry,
            StageOutcome::Drop => return Ok(Delivery::Dropped),
            StageOutcome::Replace(replacement) => {
                self.metrics.record_replaced();
                let replacement = replacement.into_replayed();
                if !sink.accepts(&self.registry, &replacement.level)? {
                    return Ok(Delivery::Filtered);
                }
                match sink.format(replacement) {
                    StageOutcome::Continue(entry) => entry,
                    StageOutcome::Drop => return Ok(Delivery::Dropped),
                    StageOutcome::Replace(again) => return Ok(Delivery::LoopGuard(again.level)),
                }
            }
        };

        sink.write(&formatted)?;
        Ok(Delivery::Written)
    }

    fn loop_guard(&self, level: &str) -> LoggerError {
        debug_assert!(
            false,
            "replayed event at level '{}' requested another replacement",
            level
        );
        let err = LoggerError::RedactionLoopGuard {
            level: level.to_string(),
        };
        eprintln!("[LOGGER CRITICAL] {}. The replacement was discarded.", err);
        self.metrics.record_dropped();
        err
    }

    fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", sink.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for LoggerCore {
    fn drop(&mut self) {
        // Final flush; errors were already reported per sink
        let _ = self.flush();

        let failures = self.metrics.sink_failures();
        if failures > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} failed sink writes (failure rate: {:.2}%)",
                failures,
                self.metrics.failure_rate()
            );
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Logger façade
///
/// Cloning is cheap. A child logger shares the sinks, pipelines, metrics
/// and profile map of its parent and carries its own default fields.
///
/// # Example
///
/// ```
/// use logpipe::prelude::*;
///
/// let logger = Logger::builder()
///     .label("Main")
///     .field("service", "api")
///     .build()
///     .unwrap();
///
/// // No sinks attached: nothing is delivered, but the call succeeds
/// let report = logger.info("Server started").unwrap();
/// assert!(report.delivered.is_empty());
/// ```
#[derive(Clone)]
pub struct Logger {
    pub(crate) core: Arc<LoggerCore>,
    fields: Arc<Fields>,
    label: Arc<str>,
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Emit an event with a message and call-site fields
    pub fn emit(&self, level: &str, message: impl Into<String>, fields: Fields) -> Result<EmitReport> {
        self.log(level, LogRecord::new(message).with_fields(fields))
    }

    /// Emit an event from a call-site record
    ///
    /// Fails only when `level` is not registered. Sink failures are reported
    /// in the returned [`EmitReport`].
    pub fn log(&self, level: impl AsRef<str>, record: impl Into<LogRecord>) -> Result<EmitReport> {
        let level = self.core.registry.canonical(level.as_ref())?;
        let entry = LogEntry::from_record(level, &self.label, &self.fields, record.into());
        self.core.dispatch(entry)
    }

    #[inline]
    pub fn trace(&self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        self.log(LogLevel::Trace, record)
    }

    #[inline]
    pub fn debug(&self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        self.log(LogLevel::Debug, record)
    }

    #[inline]
    pub fn info(&self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        self.log(LogLevel::Info, record)
    }

    #[inline]
    pub fn warn(&self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        self.log(LogLevel::Warn, record)
    }

    #[inline]
    pub fn error(&self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        self.log(LogLevel::Error, record)
    }

    #[inline]
    pub fn fatal(&self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        self.log(LogLevel::Fatal, record)
    }

    /// Derived logger whose default fields are this logger's overlaid by
    /// `fields`
    ///
    /// ```
    /// use logpipe::prelude::*;
    ///
    /// let parent = Logger::builder().field("service", "api").build().unwrap();
    /// let child = parent.child(Fields::new().with_field("service", "user-service"));
    ///
    /// assert_eq!(child.fields().get("service"), Some(&FieldValue::from("user-service")));
    /// assert_eq!(parent.fields().get("service"), Some(&FieldValue::from("api")));
    /// ```
    #[must_use]
    pub fn child(&self, fields: Fields) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            fields: Arc::new(self.fields.overlaid(&fields)),
            label: Arc::clone(&self.label),
        }
    }

    /// Derived logger with a different label
    #[must_use]
    pub fn with_label(&self, label: impl AsRef<str>) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            fields: Arc::clone(&self.fields),
            label: Arc::from(label.as_ref()),
        }
    }

    /// Flush every sink's appender
    ///
    /// All sinks are flushed; the first failure is returned.
    pub fn flush(&self) -> Result<()> {
        self.core.flush()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    pub fn registry(&self) -> &LevelRegistry {
        &self.core.registry
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn min_level(&self) -> &str {
        &self.core.min_level
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.core.sinks.iter().map(Sink::name).collect()
    }

    pub fn sink(&self, name: &str) -> Option<&Sink> {
        self.core.sinks.iter().find(|sink| sink.name() == name)
    }

    pub fn base_pipeline(&self) -> &Pipeline {
        &self.core.base
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("label", &self.label)
            .field("min_level", &self.core.min_level)
            .field("fields", &self.fields)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use logpipe::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .base_pipeline(Pipeline::new().stage(LevelTransform::new()))
///     .sink(Sink::new(
///         "console",
///         "trace",
///         Pipeline::new().stage(JsonFormatter::new()),
///         Box::new(ConsoleAppender::new()),
///     ))
///     .build()
///     .unwrap();
/// assert_eq!(logger.sink_names(), vec!["console"]);
/// ```
pub struct LoggerBuilder {
    registry: Arc<LevelRegistry>,
    min_level: Option<String>,
    label: String,
    fields: Fields,
    base: Pipeline,
    sinks: Vec<Sink>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            registry: Arc::new(LevelRegistry::default()),
            min_level: None,
            label: DEFAULT_LABEL.to_string(),
            fields: Fields::new(),
            base: Pipeline::new(),
            sinks: Vec::new(),
        }
    }

    /// Replace the level set
    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: Arc<LevelRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Set minimum log level (defaults to the registry's most verbose level)
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: impl AsRef<str>) -> Self {
        self.min_level = Some(level.as_ref().to_string());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add one default field
    #[must_use = "builder methods return a new value"]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<super::log_context::FieldValue>,
    {
        self.fields.insert(key, value);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields.merge(&fields);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn base_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.base = pipeline;
        self
    }

    /// Add a sink
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the Logger
    ///
    /// Fails with a configuration error when a level is not registered, two
    /// sinks share a name, or a base + sink pipeline path does not have
    /// exactly one serialization stage in a valid position.
    pub fn build(self) -> Result<Logger> {
        let min_level = match self.min_level {
            Some(level) => self.registry.canonical(&level)?.to_string(),
            None => self.registry.most_verbose().to_string(),
        };

        self.base.validate()?;
        for (idx, sink) in self.sinks.iter().enumerate() {
            self.registry.canonical(sink.min_level())?;
            if self.sinks[..idx].iter().any(|other| other.name() == sink.name()) {
                return Err(LoggerError::config(
                    "Logger",
                    format!("duplicate sink name '{}'", sink.name()),
                ));
            }
            Pipeline::validate_path(&self.base, sink.pipeline()).map_err(|e| {
                LoggerError::config(format!("sink '{}'", sink.name()), e.to_string())
            })?;
        }

        let core = LoggerCore {
            registry: self.registry,
            min_level,
            base: self.base,
            sinks: self.sinks,
            metrics: LoggerMetrics::new(),
            profiles: Mutex::new(HashMap::new()),
        };

        Ok(Logger {
            core: Arc::new(core),
            fields: Arc::new(self.fields),
            label: Arc::from(self.label.as_str()),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
