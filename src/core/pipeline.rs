//! Stage trait and the ordered pipeline that runs stages
//!
//! A [`Pipeline`] runs its stages strictly in order. Each stage either passes
//! a (possibly modified) entry on, drops it, or asks for it to be replaced by
//! another entry. Dropping and replacing both stop the pass immediately; the
//! replacement is routed by the logger, never by the stage itself.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use std::fmt;
use std::sync::Arc;

/// Result of running one stage (or a whole pipeline)
#[derive(Debug, Clone)]
pub enum StageOutcome {
    /// Hand the entry to the next stage
    Continue(LogEntry),
    /// Stop; no later stage runs and no sink receives the entry
    Drop,
    /// Stop and emit this entry in place of the original
    Replace(LogEntry),
}

impl StageOutcome {
    pub fn is_drop(&self) -> bool {
        matches!(self, StageOutcome::Drop)
    }
}

/// Where a stage is allowed to sit relative to serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Edits the structured entry; runs before serialization
    Transform,
    /// Attaches per-part styles; runs before serialization
    FieldStyling,
    /// Produces the rendered record; exactly one per sink path
    Serialize,
    /// Rewrites the rendered record; runs after serialization
    PostRender,
}

/// A unit of transformation
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> StageKind {
        StageKind::Transform
    }

    fn apply(&self, entry: LogEntry) -> StageOutcome;

    /// Check the stage's own settings; runs when a logger is built
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Ordered, short-circuiting composition of stages
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage (builder style)
    #[must_use = "builder methods return a new value"]
    pub fn stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append a shared stage
    pub fn push(&mut self, stage: Arc<dyn Stage>) {
        self.stages.push(stage);
    }

    /// This pipeline followed by every stage of `other`
    #[must_use]
    pub fn then(&self, other: &Pipeline) -> Pipeline {
        let mut stages = self.stages.clone();
        stages.extend(other.stages.iter().cloned());
        Pipeline { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Whether any stage serializes the entry
    pub fn has_serializer(&self) -> bool {
        self.stages
            .iter()
            .any(|stage| stage.kind() == StageKind::Serialize)
    }

    /// Run every stage in order, stopping at the first drop or replacement
    pub fn run(&self, entry: LogEntry) -> StageOutcome {
        let mut current = entry;
        for stage in &self.stages {
            match stage.apply(current) {
                StageOutcome::Continue(next) => current = next,
                stop => return stop,
            }
        }
        StageOutcome::Continue(current)
    }

    /// Check stage ordering within this pipeline alone
    ///
    /// At most one serialization stage; styling and transforms before it,
    /// post-render stages after it.
    pub fn validate(&self) -> Result<()> {
        check_order(self.stages.iter(), false)
    }

    /// Check a base pipeline and a sink pipeline as one path
    ///
    /// The combined path must contain exactly one serialization stage.
    pub fn validate_path(base: &Pipeline, sink: &Pipeline) -> Result<()> {
        check_order(base.stages.iter().chain(sink.stages.iter()), true)
    }
}

fn check_order<'a, I>(stages: I, require_serializer: bool) -> Result<()>
where
    I: Iterator<Item = &'a Arc<dyn Stage>>,
{
    let mut serializer: Option<&str> = None;
    for stage in stages {
        stage.validate()?;
        match (stage.kind(), serializer) {
            (StageKind::Serialize, Some(first)) => {
                return Err(LoggerError::config(
                    "Pipeline",
                    format!(
                        "two serialization stages attached ('{}' and '{}')",
                        first,
                        stage.name()
                    ),
                ));
            }
            (StageKind::Serialize, None) => serializer = Some(stage.name()),
            (StageKind::Transform | StageKind::FieldStyling, Some(first)) => {
                return Err(LoggerError::config(
                    "Pipeline",
                    format!("stage '{}' runs after serialization by '{}'", stage.name(), first),
                ));
            }
            (StageKind::PostRender, None) => {
                return Err(LoggerError::config(
                    "Pipeline",
                    format!("stage '{}' runs before any serialization stage", stage.name()),
                ));
            }
            _ => {}
        }
    }

    if require_serializer && serializer.is_none() {
        return Err(LoggerError::config(
            "Pipeline",
            "no serialization stage attached",
        ));
    }
    Ok(())
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
