//! Human-readable serialization stage
//!
//! Renders one line from fixed parts in fixed order:
//!
//! ```text
//! [Main]  -  [08/01/2025, 10:30:45 AM]   [api] INFO - hello (took 42ms)
//! ```
//!
//! Fields not projected into the line follow as an indented JSON block on
//! the next line.

use crate::core::log_entry::SERVICE_KEY;
use crate::core::{LogEntry, Part, Result, Stage, StageKind, StageOutcome, TimestampFormat};

/// Service shown when the entry has none
pub const DEFAULT_SERVICE: &str = "default";

#[derive(Debug, Clone)]
pub struct TextFormatter {
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::Human,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Render `entry` without storing the result
    pub fn render(&self, entry: &LogEntry) -> String {
        let paint = |part: Part, text: String| match entry.part_styles() {
            Some(table) => table.paint(part, &text),
            None => text,
        };

        let service = entry.service().unwrap_or(DEFAULT_SERVICE);
        let message = match (&entry.error, entry.message.is_empty()) {
            (Some(error), true) => sanitize_message(&error.message),
            _ => sanitize_message(&entry.message),
        };

        let mut line = format!(
            "{}  -  {}   {} {} - {}",
            paint(Part::Label, format!("[{}]", entry.label)),
            paint(
                Part::Timestamp,
                format!("[{}]", self.timestamp_format.format(&entry.timestamp()))
            ),
            paint(Part::Service, format!("[{}]", service)),
            paint(Part::Level, entry.level.clone()),
            paint(Part::Message, message),
        );

        if let Some(ms) = entry.duration_ms {
            line.push(' ');
            line.push_str(&paint(Part::Duration, format!("(took {}ms)", ms)));
        }

        if let Some(block) = remaining_fields(entry) {
            line.push('\n');
            line.push_str(&block);
        }

        line
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn kind(&self) -> StageKind {
        StageKind::Serialize
    }

    fn validate(&self) -> Result<()> {
        self.timestamp_format.validate()
    }

    fn apply(&self, mut entry: LogEntry) -> StageOutcome {
        let rendered = self.render(&entry);
        entry.set_rendered(rendered);
        StageOutcome::Continue(entry)
    }
}

/// Pretty JSON of every field the line does not show, or `None`
fn remaining_fields(entry: &LogEntry) -> Option<String> {
    let mut rest = serde_json::Map::new();
    for (key, value) in entry.fields.iter() {
        if key != SERVICE_KEY {
            rest.insert(key.clone(), value.to_json_value());
        }
    }
    if let Some(ref error) = entry.error {
        rest.insert("error".to_string(), error.to_json_value());
    }

    if rest.is_empty() {
        return None;
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(rest)).ok()
}

/// Escape line breaks and tabs so a message cannot forge extra log lines
fn sanitize_message(message: &str) -> String {
    if !message.contains(['\n', '\r', '\t']) {
        return message.to_string();
    }

    let mut sanitized = String::with_capacity(message.len() + 8);
    for c in message.chars() {
        match c {
            '\n' => sanitized.push_str("\\n"),
            '\r' => sanitized.push_str("\\r"),
            '\t' => sanitized.push_str("\\t"),
            _ => sanitized.push(c),
        }
    }
    sanitized
}
