//! Colorizer stage
//!
//! Two modes share one stage type:
//! - `Fields` runs before serialization and attaches the part style table,
//!   which the text formatter applies to each part it renders
//! - `Line` runs after serialization and wraps the whole rendered record in
//!   the style of the event's level
//!
//! Non-interactive sinks keep the same stages and append
//! [`StripStyling`](super::StripStyling) instead of skipping colorization.

use crate::core::{LevelRegistry, LogEntry, Stage, StageKind, StageOutcome, StyleTable};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Mode {
    Fields(Arc<StyleTable>),
    Line(Arc<LevelRegistry>),
}

#[derive(Debug, Clone)]
pub struct Colorizer {
    mode: Mode,
}

impl Colorizer {
    /// Per-part styling applied by the text formatter
    pub fn fields(table: StyleTable) -> Self {
        Self {
            mode: Mode::Fields(Arc::new(table)),
        }
    }

    /// Whole-record styling by level
    pub fn line(registry: Arc<LevelRegistry>) -> Self {
        Self {
            mode: Mode::Line(registry),
        }
    }
}

impl Stage for Colorizer {
    fn name(&self) -> &str {
        match self.mode {
            Mode::Fields(_) => "colorize-fields",
            Mode::Line(_) => "colorize-line",
        }
    }

    fn kind(&self) -> StageKind {
        match self.mode {
            Mode::Fields(_) => StageKind::FieldStyling,
            Mode::Line(_) => StageKind::PostRender,
        }
    }

    fn apply(&self, mut entry: LogEntry) -> StageOutcome {
        match &self.mode {
            Mode::Fields(table) => entry.set_part_styles(Arc::clone(table)),
            Mode::Line(registry) => {
                // Levels outside the registry render unstyled
                let painted = match (entry.rendered(), registry.style(&entry.level)) {
                    (Some(rendered), Ok(style)) => Some(style.paint(rendered)),
                    _ => None,
                };
                if let Some(painted) = painted {
                    entry.set_rendered(painted);
                }
            }
        }
        StageOutcome::Continue(entry)
    }
}
