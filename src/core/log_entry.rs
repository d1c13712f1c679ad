//! Log event structure and call-site record

use super::log_context::{ErrorInfo, FieldValue, Fields};
use super::style::StyleTable;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Field keys that are lifted into typed slots when an event is built
pub const PRIVATE_KEY: &str = "private";
pub const EXCEPTION_KEYS: [&str; 2] = ["exception", "error"];
pub const DURATION_KEY: &str = "durationMs";
pub const LABEL_KEY: &str = "label";
pub const SERVICE_KEY: &str = "service";

/// What a call site hands to the logger
///
/// # Examples
///
/// ```
/// use logpipe::core::{ErrorInfo, LogRecord};
///
/// let record = LogRecord::new("Payment failed")
///     .with_field("order_id", 1042)
///     .with_error(ErrorInfo::new("card declined"));
/// assert_eq!(record.fields.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    pub message: String,
    pub fields: Fields,
    pub error: Option<ErrorInfo>,
    pub label: Option<String>,
    pub private: bool,
    pub duration_ms: Option<u64>,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.merge(&fields);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    /// Override the logger's label for this event only
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Request redaction of this event
    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

impl From<&str> for LogRecord {
    fn from(message: &str) -> Self {
        LogRecord::new(message)
    }
}

impl From<String> for LogRecord {
    fn from(message: String) -> Self {
        LogRecord::new(message)
    }
}

impl From<ErrorInfo> for LogRecord {
    /// An error on its own: empty message, the error carries the content
    fn from(error: ErrorInfo) -> Self {
        LogRecord::default().with_error(error)
    }
}

/// The mutable record flowing through a pipeline
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    timestamp: DateTime<Utc>,
    pub label: String,
    pub fields: Fields,
    pub error: Option<ErrorInfo>,
    pub duration_ms: Option<u64>,
    pub private: bool,
    replayed: bool,
    part_styles: Option<Arc<StyleTable>>,
    rendered: Option<String>,
}

impl LogEntry {
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(level, message, Utc::now())
    }

    /// Build an entry with an explicit creation instant
    pub fn at(level: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            level: level.into(),
            message: message.into(),
            timestamp,
            label: String::new(),
            fields: Fields::new(),
            error: None,
            duration_ms: None,
            private: false,
            replayed: false,
            part_styles: None,
            rendered: None,
        }
    }

    /// Build an entry from a call-site record
    ///
    /// `defaults` are overlaid by the record's fields; reserved keys are then
    /// lifted into their typed slots. Explicit record settings win over
    /// reserved keys.
    pub fn from_record(level: &str, label: &str, defaults: &Fields, record: LogRecord) -> Self {
        let mut entry = LogEntry::new(level, record.message);
        entry.label = label.to_string();
        entry.fields = defaults.overlaid(&record.fields);
        entry.lift_reserved_fields();

        if let Some(label) = record.label {
            entry.label = label;
        }
        if record.error.is_some() {
            entry.error = record.error;
        }
        if record.duration_ms.is_some() {
            entry.duration_ms = record.duration_ms;
        }
        entry.private |= record.private;
        entry
    }

    fn lift_reserved_fields(&mut self) {
        if let Some(flag) = self.fields.get(PRIVATE_KEY).and_then(FieldValue::as_bool) {
            self.private = flag;
            self.fields.remove(PRIVATE_KEY);
        }

        for key in EXCEPTION_KEYS {
            if !matches!(self.fields.get(key), Some(FieldValue::Error(_))) {
                continue;
            }
            if let Some(FieldValue::Error(err)) = self.fields.remove(key) {
                self.error.get_or_insert(err);
            }
        }

        if let Some(ms) = self.fields.get(DURATION_KEY).and_then(FieldValue::as_millis) {
            self.duration_ms = Some(ms);
            self.fields.remove(DURATION_KEY);
        }

        if let Some(label) = self.fields.get(LABEL_KEY).and_then(FieldValue::as_str) {
            let label = label.to_string();
            self.fields.remove(LABEL_KEY);
            self.label = label;
        }
    }

    /// Instant of creation; fixed for the life of the entry
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this entry is a replacement produced by an earlier pass
    pub fn is_replayed(&self) -> bool {
        self.replayed
    }

    /// Tag this entry as a replacement so it is not replaced again
    #[must_use]
    pub fn into_replayed(mut self) -> Self {
        self.replayed = true;
        self.rendered = None;
        self
    }

    pub fn part_styles(&self) -> Option<&StyleTable> {
        self.part_styles.as_deref()
    }

    pub fn set_part_styles(&mut self, styles: Arc<StyleTable>) {
        self.part_styles = Some(styles);
    }

    /// Serialized form, present once a serialization stage has run
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn set_rendered(&mut self, rendered: String) {
        self.rendered = Some(rendered);
    }

    /// Value of the `service` field when it is a string
    pub fn service(&self) -> Option<&str> {
        self.fields.get(SERVICE_KEY).and_then(FieldValue::as_str)
    }
}
