//! Core logger types and traits

pub mod appender;
pub mod error;
pub mod level_registry;
pub mod log_context;
pub mod log_entry;
pub mod logger;
pub mod metrics;
pub mod pipeline;
pub mod sink;
pub mod style;
pub mod timer;
pub mod timestamp;

pub use appender::Appender;
pub use error::{LoggerError, Result};
pub use level_registry::{LevelRegistry, LevelSpec, LogLevel};
pub use log_context::{ErrorInfo, FieldValue, Fields};
pub use log_entry::{LogEntry, LogRecord};
pub use logger::{EmitReport, Logger, LoggerBuilder, DEFAULT_LABEL};
pub use metrics::LoggerMetrics;
pub use pipeline::{Pipeline, Stage, StageKind, StageOutcome};
pub use sink::Sink;
pub use style::{Part, Style, StyleTable};
pub use timer::TimerHandle;
pub use timestamp::TimestampFormat;
