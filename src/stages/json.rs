//! Machine-readable serialization stage: one JSON object per record

use crate::core::log_entry::DURATION_KEY;
use crate::core::{LogEntry, Result, Stage, StageKind, StageOutcome, TimestampFormat};

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
}

impl JsonFormatter {
    /// JSON output with ISO 8601 timestamps
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Build the JSON object for `entry`
    ///
    /// Fixed keys are written first; a field sharing a fixed key's name does
    /// not overwrite it.
    pub fn to_value(&self, entry: &LogEntry) -> serde_json::Value {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            self.timestamp_format.to_json_value(&entry.timestamp()),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(entry.level.clone()),
        );
        json_obj.insert(
            "label".to_string(),
            serde_json::Value::String(entry.label.clone()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(entry.message.clone()),
        );
        if let Some(ms) = entry.duration_ms {
            json_obj.insert(DURATION_KEY.to_string(), serde_json::Value::Number(ms.into()));
        }
        if let Some(ref error) = entry.error {
            json_obj.insert("error".to_string(), error.to_json_value());
        }

        for (key, value) in entry.fields.iter() {
            json_obj
                .entry(key.clone())
                .or_insert_with(|| value.to_json_value());
        }

        serde_json::Value::Object(json_obj)
    }
}

impl Stage for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn kind(&self) -> StageKind {
        StageKind::Serialize
    }

    fn validate(&self) -> Result<()> {
        self.timestamp_format.validate()
    }

    fn apply(&self, mut entry: LogEntry) -> StageOutcome {
        let rendered = self.to_value(&entry).to_string();
        entry.set_rendered(rendered);
        StageOutcome::Continue(entry)
    }
}
