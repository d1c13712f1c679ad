//! Removes ANSI styling from the rendered record

use crate::core::{LogEntry, Stage, StageKind, StageOutcome};

/// Post-render stage for sinks that are not terminals
#[derive(Debug, Clone, Copy, Default)]
pub struct StripStyling;

impl StripStyling {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for StripStyling {
    fn name(&self) -> &str {
        "strip-styling"
    }

    fn kind(&self) -> StageKind {
        StageKind::PostRender
    }

    fn apply(&self, mut entry: LogEntry) -> StageOutcome {
        let stripped = entry
            .rendered()
            .filter(|rendered| rendered.contains('\x1b'))
            .map(strip_ansi);
        if let Some(stripped) = stripped {
            entry.set_rendered(stripped);
        }
        StageOutcome::Continue(entry)
    }
}

/// Drop every `ESC [ ... <letter>` sequence from `input`
pub fn strip_ansi(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            result.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            // Parameters run until the final letter
            for next_c in chars.by_ref() {
                if next_c.is_ascii_alphabetic() {
                    break;
                }
            }
        }
    }

    result
}
