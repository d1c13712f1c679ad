//! Closure-backed stage for user transformations

use crate::core::{LogEntry, Stage, StageKind, StageOutcome};
use std::fmt;

type StageFn = dyn Fn(LogEntry) -> StageOutcome + Send + Sync;

/// Wraps a closure as a pipeline stage
///
/// # Example
///
/// ```
/// use logpipe::core::{LogEntry, Pipeline, StageOutcome};
/// use logpipe::stages::FnStage;
///
/// let enrich = FnStage::new("hostname", |mut entry: LogEntry| {
///     entry.fields.insert("host", "web-1");
///     StageOutcome::Continue(entry)
/// });
/// let pipeline = Pipeline::new().stage(enrich);
/// assert_eq!(pipeline.stage_names(), vec!["hostname"]);
/// ```
pub struct FnStage {
    name: String,
    kind: StageKind,
    func: Box<StageFn>,
}

impl FnStage {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(LogEntry) -> StageOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: StageKind::Transform,
            func: Box::new(func),
        }
    }

    /// Place the stage elsewhere relative to serialization
    #[must_use]
    pub fn with_kind(mut self, kind: StageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Stage that drops every entry `predicate` rejects
    pub fn filter<P>(name: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&LogEntry) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |entry| {
            if predicate(&entry) {
                StageOutcome::Continue(entry)
            } else {
                StageOutcome::Drop
            }
        })
    }
}

impl Stage for FnStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StageKind {
        self.kind
    }

    fn apply(&self, entry: LogEntry) -> StageOutcome {
        (self.func)(entry)
    }
}

impl fmt::Debug for FnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}
