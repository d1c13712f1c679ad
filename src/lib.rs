//! # logpipe
//!
//! A structured-logging pipeline. Call sites emit events through a
//! [`Logger`]; each event runs through an ordered chain of stages and is
//! routed to any number of sinks, each with its own level threshold and
//! formatting.
//!
//! ## Features
//!
//! - **Ordered stages**: short-circuiting pipelines with drop and replace
//!   outcomes
//! - **Redaction and promotion**: private events are replaced by a
//!   placeholder, error events carrying an error are escalated to fatal
//! - **Per-sink formatting**: colored text, plain text or JSON per sink
//! - **Child loggers**: derived loggers with inherited default fields
//! - **Timers and profiles**: durations recorded on the emitted event
//!
//! ## Example
//!
//! ```
//! use logpipe::prelude::*;
//! use std::collections::HashMap;
//!
//! let mut config = LoggingConfig::default();
//! config.sinks = vec![SinkConfig::console("console")];
//!
//! let mut appenders: HashMap<String, Box<dyn Appender>> = HashMap::new();
//! appenders.insert("console".to_string(), Box::new(ConsoleAppender::new()));
//!
//! let logger = assemble(&config, Environment::Production, appenders).unwrap();
//! let report = logger.info("Server started").unwrap();
//! assert!(report.delivered_to("console"));
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod macros;
pub mod stages;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::config::{assemble, Environment, LoggingConfig, SinkConfig, SinkKind};
    pub use crate::core::{
        Appender, EmitReport, ErrorInfo, FieldValue, Fields, LevelRegistry, LevelSpec, LogEntry,
        LogLevel, LogRecord, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Pipeline, Result,
        Sink, Stage, StageKind, StageOutcome, Style, StyleTable, TimerHandle, TimestampFormat,
    };
    pub use crate::stages::{
        Colorizer, FnStage, JsonFormatter, LevelTransform, StripStyling, TextFormatter,
    };
}

pub use appenders::{ConsoleAppender, FileAppender};
pub use config::{assemble, Environment, LoggingConfig};
pub use core::{
    Appender, EmitReport, ErrorInfo, FieldValue, Fields, LevelRegistry, LogEntry, LogLevel,
    LogRecord, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Pipeline, Result, Sink, Stage,
    StageOutcome, TimerHandle,
};
