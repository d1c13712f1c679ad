//! Level transform: redaction, exception promotion and level display form
//!
//! Runs first in the base pipeline. Checks happen in a fixed order and the
//! first match wins:
//! 1. a private event is replaced by a placeholder at the same level
//! 2. an error-level event carrying an error is replaced by a copy at the
//!    promotion level
//! 3. otherwise the level is rewritten to ASCII upper case and the event
//!    continues
//!
//! Replacements come back tagged as replayed. A replayed event only gets
//! step 3, so it can never be replaced a second time.

use crate::core::log_context::Fields;
use crate::core::log_entry::SERVICE_KEY;
use crate::core::{LogEntry, Stage, StageOutcome};

pub const REDACTED_MESSAGE: &str = "Redacted message";

#[derive(Debug, Clone)]
pub struct LevelTransform {
    promote_from: String,
    promote_to: String,
    placeholder: String,
}

impl LevelTransform {
    pub fn new() -> Self {
        Self {
            promote_from: "error".to_string(),
            promote_to: "fatal".to_string(),
            placeholder: REDACTED_MESSAGE.to_string(),
        }
    }

    /// Change which level gets escalated, and to what
    #[must_use]
    pub fn with_promotion(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.promote_from = from.into();
        self.promote_to = to.into();
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn promotion(&self) -> (&str, &str) {
        (&self.promote_from, &self.promote_to)
    }

    fn placeholder_for(&self, original: &LogEntry) -> LogEntry {
        let mut placeholder =
            LogEntry::at(original.level.clone(), self.placeholder.clone(), original.timestamp());
        placeholder.label = original.label.clone();
        // Keep the origin visible in the audit trail, nothing else
        if let Some(service) = original.fields.get(SERVICE_KEY) {
            placeholder.fields = Fields::new().with_field(SERVICE_KEY, service.clone());
        }
        placeholder.into_replayed()
    }
}

impl Default for LevelTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for LevelTransform {
    fn name(&self) -> &str {
        "level-transform"
    }

    fn apply(&self, mut entry: LogEntry) -> StageOutcome {
        if !entry.is_replayed() {
            if entry.private {
                return StageOutcome::Replace(self.placeholder_for(&entry));
            }

            if entry.error.is_some() && entry.level.eq_ignore_ascii_case(&self.promote_from) {
                let mut promoted = entry.into_replayed();
                promoted.level = self.promote_to.clone();
                return StageOutcome::Replace(promoted);
            }
        }

        // ASCII only: registry lookups fold ASCII case and nothing else
        entry.level = entry.level.to_ascii_uppercase();
        StageOutcome::Continue(entry)
    }
}
