//! Environment-conditional assembly
//!
//! One configuration describes the levels, part styles and sinks. The
//! environment decides how every sink renders:
//!
//! | | threshold | sink pipeline |
//! |---|---|---|
//! | development | `trace` | field colors, text, line colors (+ strip for non-terminals) |
//! | production | `info` | JSON with ISO 8601 timestamps |
//!
//! The base pipeline is the same in both: [`LevelTransform`].

use crate::appenders::{ConsoleAppender, FileAppender};
use crate::core::{
    Appender, LevelRegistry, LevelSpec, Logger, LoggerError, Pipeline, Result, Sink, StyleTable,
    TimestampFormat, DEFAULT_LABEL,
};
use crate::stages::{Colorizer, JsonFormatter, LevelTransform, StripStyling, TextFormatter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the process runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Variable read by [`Environment::detect`]
    pub const ENV_VAR: &'static str = "APP_ENV";

    pub fn from_production_flag(production: bool) -> Self {
        if production {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// Production when `APP_ENV` is `production`, development otherwise
    pub fn detect() -> Self {
        let production = std::env::var(Self::ENV_VAR)
            .map(|value| value.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        Self::from_production_flag(production)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Logger threshold when the configuration does not set one
    pub fn default_min_level(&self) -> &'static str {
        match self {
            Environment::Development => "trace",
            Environment::Production => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Console,
    File,
}

/// One output target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    pub name: String,
    pub kind: SinkKind,
    /// File path; required for file sinks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Sink threshold; every level when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_level: Option<String>,
}

impl SinkConfig {
    pub fn console(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SinkKind::Console,
            path: None,
            min_level: None,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: SinkKind::File,
            path: Some(path.into()),
            min_level: None,
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: impl Into<String>) -> Self {
        self.min_level = Some(level.into());
        self
    }
}

/// Logging configuration
///
/// Every key is optional in JSON; missing keys take the defaults below.
///
/// # Example
///
/// ```
/// use logpipe::config::LoggingConfig;
///
/// let config = LoggingConfig::from_json(r#"{ "label": "Billing", "service": "payments" }"#).unwrap();
/// assert_eq!(config.label, "Billing");
/// assert_eq!(config.sinks.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub label: String,
    /// Default `service` field; the text format shows `default` without it
    pub service: Option<String>,
    /// Logger threshold; the environment's default when absent
    pub min_level: Option<String>,
    pub levels: Vec<LevelSpec>,
    pub part_styles: StyleTable,
    /// Timestamps of the human-readable output
    pub text_timestamp: TimestampFormat,
    /// Timestamps of the JSON output
    pub json_timestamp: TimestampFormat,
    /// Directory that relative file paths resolve against
    pub log_dir: Option<PathBuf>,
    pub sinks: Vec<SinkConfig>,
}

impl Default for LoggingConfig {
    /// Console for everything, `combined.log` for everything, `error.log`
    /// for `warn` and above
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            service: None,
            min_level: None,
            levels: LevelRegistry::default().specs().to_vec(),
            part_styles: StyleTable::default(),
            text_timestamp: TimestampFormat::Human,
            json_timestamp: TimestampFormat::Iso8601,
            log_dir: None,
            sinks: vec![
                SinkConfig::console("console"),
                SinkConfig::file("combined", "combined.log"),
                SinkConfig::file("error", "error.log").with_min_level("warn"),
            ],
        }
    }
}

impl LoggingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Resolved path of a file sink
    pub fn sink_path(&self, sink: &SinkConfig) -> Result<PathBuf> {
        let path = sink.path.as_ref().ok_or_else(|| {
            LoggerError::config(format!("sink '{}'", sink.name), "file sink without a path")
        })?;
        Ok(match &self.log_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.clone(),
        })
    }
}

/// Build a logger from `config` for `env`, writing through the given
/// appenders
///
/// `appenders` maps sink names to their write primitives; every configured
/// sink needs one.
pub fn assemble(
    config: &LoggingConfig,
    env: Environment,
    mut appenders: HashMap<String, Box<dyn Appender>>,
) -> Result<Logger> {
    let registry = Arc::new(LevelRegistry::new(config.levels.clone())?);

    let mut builder = Logger::builder()
        .registry(Arc::clone(&registry))
        .min_level(
            config
                .min_level
                .as_deref()
                .unwrap_or_else(|| env.default_min_level()),
        )
        .label(config.label.as_str())
        .base_pipeline(Pipeline::new().stage(LevelTransform::new()));

    if let Some(ref service) = config.service {
        builder = builder.field("service", service.as_str());
    }

    for sink in &config.sinks {
        let appender = appenders.remove(&sink.name).ok_or_else(|| {
            LoggerError::config(format!("sink '{}'", sink.name), "no appender supplied")
        })?;

        let pipeline = match env {
            Environment::Production => Pipeline::new()
                .stage(JsonFormatter::new().with_timestamp_format(config.json_timestamp.clone())),
            Environment::Development => {
                let pipeline = Pipeline::new()
                    .stage(Colorizer::fields(config.part_styles.clone()))
                    .stage(
                        TextFormatter::new().with_timestamp_format(config.text_timestamp.clone()),
                    )
                    .stage(Colorizer::line(Arc::clone(&registry)));
                if sink.kind == SinkKind::File || !appender.is_interactive() {
                    pipeline.stage(StripStyling::new())
                } else {
                    pipeline
                }
            }
        };

        let min_level = sink
            .min_level
            .clone()
            .unwrap_or_else(|| registry.most_verbose().to_string());
        builder = builder.sink(Sink::new(sink.name.as_str(), min_level, pipeline, appender));
    }

    if let Some(unused) = appenders.keys().next() {
        return Err(LoggerError::config(
            "assemble",
            format!("appender supplied for unknown sink '{}'", unused),
        ));
    }

    builder.build()
}

impl Logger {
    /// Build a logger writing to the real console and files of `config`
    pub fn from_config(config: &LoggingConfig, env: Environment) -> Result<Logger> {
        let mut appenders: HashMap<String, Box<dyn Appender>> = HashMap::new();
        for sink in &config.sinks {
            let appender: Box<dyn Appender> = match sink.kind {
                SinkKind::Console => Box::new(ConsoleAppender::new()),
                SinkKind::File => Box::new(FileAppender::new(config.sink_path(sink)?)?),
            };
            appenders.insert(sink.name.clone(), appender);
        }
        assemble(config, env, appenders)
    }

    /// Default configuration for the detected environment
    pub fn from_env() -> Result<Logger> {
        Logger::from_config(&LoggingConfig::default(), Environment::detect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_environment_flag() {
        assert_eq!(Environment::from_production_flag(true), Environment::Production);
        assert_eq!(Environment::from_production_flag(false), Environment::Development);
        assert_eq!(Environment::Production.default_min_level(), "info");
        assert_eq!(Environment::Development.default_min_level(), "trace");
    }

    #[test]
    fn test_default_sinks_mirror_standard_layout() {
        let config = LoggingConfig::default();
        let names: Vec<&str> = config.sinks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["console", "combined", "error"]);
        assert_eq!(config.sinks[2].min_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "label": "Worker",
            "min_level": "debug",
            "sinks": [
                { "name": "out", "kind": "console" },
                { "name": "errors", "kind": "file", "path": "errors.log", "min_level": "error" }
            ]
        }"#;
        let config = LoggingConfig::from_json(json).unwrap();
        assert_eq!(config.label, "Worker");
        assert_eq!(config.levels.len(), 6);
        assert_eq!(config.sinks[1].kind, SinkKind::File);
    }

    #[test]
    fn test_config_rejects_incomplete_style_table() {
        let json = r#"{ "part_styles": { "label": "green" } }"#;
        assert!(LoggingConfig::from_json(json).is_err());
    }

    #[test]
    fn test_sink_path_resolution() {
        let config = LoggingConfig::default().with_log_dir("/var/log/app");
        let path = config.sink_path(&config.sinks[1]).unwrap();
        assert_eq!(path, PathBuf::from("/var/log/app/combined.log"));
        assert!(config.sink_path(&config.sinks[0]).is_err());
    }

    #[test]
    fn test_assemble_requires_every_appender() {
        let config = LoggingConfig::default();
        let result = assemble(&config, Environment::Production, HashMap::new());
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_assemble_pipelines_by_environment() {
        let mut config = LoggingConfig::default();
        config.sinks.truncate(1);

        let appenders = || {
            let mut map: HashMap<String, Box<dyn Appender>> = HashMap::new();
            map.insert("console".to_string(), Box::new(ConsoleAppender::with_colors(true)));
            map
        };

        let dev = assemble(&config, Environment::Development, appenders()).unwrap();
        assert_eq!(dev.min_level(), "trace");
        assert_eq!(
            dev.sink("console").unwrap().pipeline().stage_names(),
            vec!["colorize-fields", "text", "colorize-line"]
        );

        let prod = assemble(&config, Environment::Production, appenders()).unwrap();
        assert_eq!(prod.min_level(), "info");
        assert_eq!(prod.sink("console").unwrap().pipeline().stage_names(), vec!["json"]);
        assert_eq!(prod.base_pipeline().stage_names(), vec!["level-transform"]);
    }

    #[test]
    fn test_from_config_opens_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = LoggingConfig::default().with_log_dir(temp_dir.path());
        config.sinks.remove(0);

        let logger = Logger::from_config(&config, Environment::Production).unwrap();
        logger.warn("disk almost full").unwrap();
        logger.flush().unwrap();

        let combined = fs::read_to_string(temp_dir.path().join("combined.log")).unwrap();
        let errors = fs::read_to_string(temp_dir.path().join("error.log")).unwrap();
        assert!(combined.contains("disk almost full"));
        assert!(errors.contains("\"level\":\"WARN\""));
    }
}
