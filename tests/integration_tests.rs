//! Integration tests for the logging pipeline
//!
//! These tests verify:
//! - Redaction and exception promotion end to end
//! - Child logger field inheritance
//! - Human-readable and JSON rendering
//! - Per-sink thresholds and failure isolation
//! - Timers and profiles
//! - Development vs production assembly
//! - Thread safety

use logpipe::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-memory appender; clones share the same buffer
#[derive(Clone, Default)]
struct MemoryAppender {
    lines: Arc<Mutex<Vec<String>>>,
    interactive: bool,
}

impl MemoryAppender {
    fn interactive() -> Self {
        Self {
            interactive: true,
            ..Self::default()
        }
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn json_lines(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).expect("valid json line"))
            .collect()
    }
}

impl Appender for MemoryAppender {
    fn write(&mut self, record: &[u8]) -> logpipe::Result<()> {
        let text = String::from_utf8_lossy(record);
        let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
        self.lines.lock().unwrap().push(text);
        Ok(())
    }

    fn flush(&mut self) -> logpipe::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

struct Harness {
    logger: Logger,
    sinks: HashMap<String, MemoryAppender>,
}

impl Harness {
    fn sink(&self, name: &str) -> &MemoryAppender {
        &self.sinks[name]
    }
}

/// The standard three-sink layout, backed by memory
fn standard(env: Environment, service: Option<&str>) -> Harness {
    let mut config = LoggingConfig::default();
    config.service = service.map(str::to_string);
    with_config(&config, env, &[])
}

fn with_config(config: &LoggingConfig, env: Environment, interactive: &[&str]) -> Harness {
    let mut sinks = HashMap::new();
    let mut appenders: HashMap<String, Box<dyn Appender>> = HashMap::new();
    for sink in &config.sinks {
        let appender = if interactive.contains(&sink.name.as_str()) {
            MemoryAppender::interactive()
        } else {
            MemoryAppender::default()
        };
        appenders.insert(sink.name.clone(), Box::new(appender.clone()));
        sinks.insert(sink.name.clone(), appender);
    }

    let logger = assemble(config, env, appenders).expect("Failed to assemble logger");
    Harness { logger, sinks }
}

// ============================================================================
// Redaction and promotion
// ============================================================================

#[test]
fn test_private_event_never_reaches_sinks() {
    let harness = standard(Environment::Development, Some("auth"));

    harness
        .logger
        .warn(LogRecord::new("password=hunter2").with_field("token", "abc").private())
        .expect("emit");

    for name in ["console", "combined", "error"] {
        let lines = harness.sink(name).lines();
        assert_eq!(lines.len(), 1, "sink '{}' should hold one placeholder", name);
        assert!(!lines[0].contains("hunter2"));
        assert!(!lines[0].contains("abc"));
        assert!(lines[0].contains("WARN - Redacted message"));
        assert!(lines[0].contains("[auth]"));
    }
    assert_eq!(harness.logger.metrics().replaced(), 1);
}

#[test]
fn test_private_flag_as_field() {
    let harness = standard(Environment::Production, None);

    let fields = Fields::new().with_field("private", true);
    harness.logger.emit("debug", "This is a debug message", fields).unwrap();
    harness.logger.info("Production hides debug").unwrap();

    let lines = harness.sink("combined").json_lines();
    assert_eq!(lines.len(), 1, "debug placeholder is below the production threshold");
    assert_eq!(lines[0]["message"], "Production hides debug");
}

#[test]
fn test_error_with_exception_promoted_to_fatal() {
    let harness = standard(Environment::Production, None);

    let error = ErrorInfo::new("This is an error message with a stack").with_stack("at main");
    harness.logger.error(error).unwrap();

    for name in ["console", "combined", "error"] {
        let lines = harness.sink(name).json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "FATAL");
        assert_eq!(lines[0]["error"]["stack"], "at main");
    }
}

#[test]
fn test_error_text_only_not_promoted() {
    let harness = standard(Environment::Production, None);

    harness
        .logger
        .error("This is an error message that is only text")
        .unwrap();

    let lines = harness.sink("error").json_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "ERROR");
    assert!(lines[0].get("error").is_none());
}

#[test]
fn test_exception_field_is_lifted() {
    let harness = standard(Environment::Production, None);

    let record = LogRecord::new("lookup failed").with_field("exception", ErrorInfo::new("boom"));
    harness.logger.error(record).unwrap();

    let lines = harness.sink("combined").json_lines();
    assert_eq!(lines[0]["level"], "FATAL");
    assert_eq!(lines[0]["error"]["message"], "boom");
    assert!(lines[0].get("exception").is_none());
}

// ============================================================================
// Child loggers
// ============================================================================

#[test]
fn test_child_logger_field_merge() {
    let harness = standard(Environment::Production, Some("api"));

    let child = harness.logger.child(
        Fields::new()
            .with_field("service", "user-service")
            .with_field(
                "context",
                Fields::new()
                    .with_field("request", "GET /user")
                    .with_field("userId", 1),
            ),
    );

    child
        .info(LogRecord::new("child message").with_field("userId", 2))
        .unwrap();
    harness.logger.info("parent message").unwrap();

    let lines = harness.sink("combined").json_lines();
    assert_eq!(lines[0]["service"], "user-service");
    assert_eq!(lines[0]["context"]["request"], "GET /user");
    assert_eq!(lines[0]["userId"], 2);

    assert_eq!(lines[1]["service"], "api");
    assert!(lines[1].get("context").is_none());
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_text_rendering_order() {
    let harness = standard(Environment::Development, Some("svc"));

    harness
        .logger
        .info(LogRecord::new("hello").with_duration_ms(42))
        .unwrap();

    let line = &harness.sink("combined").lines()[0];
    assert!(line.starts_with("[Main]  -  ["), "line was {:?}", line);
    assert!(
        line.ends_with("]   [svc] INFO - hello (took 42ms)"),
        "line was {:?}",
        line
    );
}

#[test]
fn test_text_rendering_remaining_fields() {
    let harness = standard(Environment::Development, None);

    harness
        .logger
        .info(LogRecord::new("User logged in").with_field("user_id", "12345"))
        .unwrap();

    let record = &harness.sink("combined").lines()[0];
    let (line, block) = record.split_once('\n').expect("field block");
    assert!(line.contains("[default] INFO - User logged in"));
    assert_eq!(block, "{\n  \"user_id\": \"12345\"\n}");
}

#[test]
fn test_log_injection_prevention() {
    let harness = standard(Environment::Development, None);

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    harness.logger.info(malicious_message).unwrap();

    let line = &harness.sink("combined").lines()[0];
    assert!(line.contains("\\n"));
    assert_eq!(line.lines().count(), 1, "Log should be a single line, not multiple");
}

#[test]
fn test_interactive_console_is_colored() {
    colored::control::set_override(true);
    let mut config = LoggingConfig::default();
    config.sinks.truncate(1);
    let harness = with_config(&config, Environment::Development, &["console"]);

    harness.logger.fatal("colors").unwrap();

    let line = &harness.sink("console").lines()[0];
    // Whole line in the fatal style, label in green inside it
    assert!(line.starts_with("\x1b[1;31m\x1b[32m[Main]\x1b[0m"));
    assert!(line.ends_with("\x1b[0m"));
}

#[test]
fn test_files_never_contain_escape_codes() {
    colored::control::set_override(true);
    let mut config = LoggingConfig::default();
    config.sinks[0] = SinkConfig::console("console");
    let harness = with_config(&config, Environment::Development, &["console", "combined"]);

    harness
        .logger
        .warn(LogRecord::new("styled").with_duration_ms(3))
        .unwrap();

    // File sinks strip styling even when their appender claims a terminal
    assert!(harness.sink("console").lines()[0].contains('\x1b'));
    assert!(!harness.sink("combined").lines()[0].contains('\x1b'));
    assert!(!harness.sink("error").lines()[0].contains('\x1b'));
}

#[test]
fn test_json_completeness() {
    let harness = standard(Environment::Production, Some("billing"));

    harness
        .logger
        .warn(
            LogRecord::new("slow charge")
                .with_field("order_id", 1042)
                .with_field("retry", true)
                .with_duration_ms(870),
        )
        .unwrap();

    let value = &harness.sink("combined").json_lines()[0];
    assert_eq!(value["level"], "WARN");
    assert_eq!(value["label"], "Main");
    assert_eq!(value["message"], "slow charge");
    assert_eq!(value["service"], "billing");
    assert_eq!(value["order_id"], 1042);
    assert_eq!(value["retry"], true);
    assert_eq!(value["durationMs"], 870);
    assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_sink_thresholds() {
    let harness = standard(Environment::Development, None);

    harness.logger.fatal("This is a fatal message").unwrap();
    harness.logger.error("This is an error message").unwrap();
    harness.logger.warn("This is a warning message").unwrap();
    harness.logger.info("This is an info message").unwrap();
    harness.logger.debug("This is a debug message").unwrap();
    harness.logger.trace("This is a trace message").unwrap();

    assert_eq!(harness.sink("console").lines().len(), 6);
    assert_eq!(harness.sink("combined").lines().len(), 6);

    let errors = harness.sink("error").lines();
    assert_eq!(errors.len(), 3);
    assert!(errors[2].contains("WARN - This is a warning message"));
}

#[test]
fn test_sink_failure_isolation() {
    struct FailingAppender;

    impl Appender for FailingAppender {
        fn write(&mut self, _record: &[u8]) -> logpipe::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "Simulated failure").into())
        }

        fn flush(&mut self) -> logpipe::Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "FailingAppender"
        }
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn write(&mut self, _record: &[u8]) -> logpipe::Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> logpipe::Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "PanickingAppender"
        }
    }

    let healthy = MemoryAppender::default();
    let json = || Pipeline::new().stage(JsonFormatter::new());
    let logger = Logger::builder()
        .base_pipeline(Pipeline::new().stage(LevelTransform::new()))
        .sink(Sink::new("failing", "trace", json(), Box::new(FailingAppender)))
        .sink(Sink::new("panicking", "trace", json(), Box::new(PanickingAppender)))
        .sink(Sink::new("healthy", "trace", json(), Box::new(healthy.clone())))
        .build()
        .unwrap();

    for _ in 0..5 {
        let report = logger.info("Test message").expect("emit never fails on sink errors");
        assert_eq!(report.delivered, vec!["healthy".to_string()]);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(LoggerError::is_sink_failure));
    }

    assert_eq!(healthy.lines().len(), 5);
    assert_eq!(logger.metrics().sink_failures(), 10);
    assert_eq!(logger.metrics().delivered(), 5);
}

#[test]
fn test_unknown_level_is_an_error() {
    let harness = standard(Environment::Development, None);
    let err = harness.logger.log("verbose", "not a level").unwrap_err();
    assert!(matches!(err, LoggerError::UnknownLevel { .. }));
    assert!(harness.sink("console").lines().is_empty());
}

#[test]
fn test_non_ascii_level_reaches_sinks() {
    let registry = LevelRegistry::new(vec![
        LevelSpec::new("fatal", 0, Style::neutral()),
        LevelSpec::new("error", 1, Style::neutral()),
        LevelSpec::new("prüfung", 2, Style::neutral()),
    ])
    .unwrap();

    let sink = MemoryAppender::default();
    let logger = Logger::builder()
        .registry(Arc::new(registry))
        .base_pipeline(Pipeline::new().stage(LevelTransform::new()))
        .sink(Sink::new(
            "memory",
            "prüfung",
            Pipeline::new().stage(JsonFormatter::new()),
            Box::new(sink.clone()),
        ))
        .build()
        .unwrap();

    let report = logger.log("prüfung", "hello").unwrap();
    assert!(report.is_clean(), "failures: {:?}", report.failures);
    assert!(report.delivered_to("memory"));
    assert_eq!(sink.json_lines()[0]["message"], "hello");
}

#[test]
fn test_custom_stages_in_base_pipeline() {
    let sink = MemoryAppender::default();
    let logger = Logger::builder()
        .base_pipeline(
            Pipeline::new()
                .stage(FnStage::filter("no-health", |entry| {
                    entry.message != "healthcheck"
                }))
                .stage(FnStage::new("host", |mut entry: LogEntry| {
                    entry.fields.insert("host", "web-1");
                    StageOutcome::Continue(entry)
                }))
                .stage(LevelTransform::new()),
        )
        .sink(Sink::new(
            "memory",
            "trace",
            Pipeline::new().stage(JsonFormatter::new()),
            Box::new(sink.clone()),
        ))
        .build()
        .unwrap();

    logger.info("healthcheck").unwrap();
    logger.info("order placed").unwrap();

    let lines = sink.json_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["host"], "web-1");
    assert_eq!(logger.metrics().dropped(), 1);
}

// ============================================================================
// Timers and profiles
// ============================================================================

#[test]
fn test_profile_lifecycle() {
    let harness = standard(Environment::Production, None);

    assert!(harness.logger.profile("test").unwrap().is_none());
    let timer = harness.logger.start_timer();

    let report = harness
        .logger
        .profile_with("test", "warn", "This is a profile message")
        .unwrap()
        .expect("second call stops the profile");
    assert!(report.delivered_to("error"));

    timer.done("info", "This is a profile timer end").unwrap();

    let lines = harness.sink("combined").json_lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["message"], "This is a profile message");
    assert_eq!(lines[0]["level"], "WARN");
    assert!(lines[0]["durationMs"].is_u64());
    assert!(lines[1]["durationMs"].is_u64());

    // Third call starts again without emitting
    assert!(harness.logger.profile("test").unwrap().is_none());
    assert_eq!(harness.sink("combined").lines().len(), 2);
}

// ============================================================================
// Environment assembly
// ============================================================================

#[test]
fn test_debug_emitted_in_development_only() {
    let dev = standard(Environment::Development, None);
    let prod = standard(Environment::Production, None);

    dev.logger.debug("debug details").unwrap();
    prod.logger.debug("debug details").unwrap();

    assert_eq!(dev.sink("console").lines().len(), 1);
    assert!(prod.sink("console").lines().is_empty());
    assert_eq!(prod.logger.metrics().suppressed(), 1);
}

#[test]
fn test_invalid_timestamp_pattern_rejected_at_assembly() {
    let mut config = LoggingConfig::default();
    config.text_timestamp = TimestampFormat::Custom("%Q".to_string());

    let appenders = |config: &LoggingConfig| -> HashMap<String, Box<dyn Appender>> {
        config
            .sinks
            .iter()
            .map(|sink| {
                (
                    sink.name.clone(),
                    Box::new(MemoryAppender::default()) as Box<dyn Appender>,
                )
            })
            .collect()
    };

    let err = assemble(&config, Environment::Development, appenders(&config)).unwrap_err();
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    assert!(err.to_string().contains("%Q"));

    // Production renders JSON only, so the text pattern is never used
    assert!(assemble(&config, Environment::Production, appenders(&config)).is_ok());

    config.json_timestamp = TimestampFormat::Custom("%Q".to_string());
    assert!(assemble(&config, Environment::Production, appenders(&config)).is_err());
}

#[test]
fn test_from_config_writes_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = LoggingConfig::default().with_log_dir(temp_dir.path());
    config.sinks.remove(0);

    {
        let logger = Logger::from_config(&config, Environment::Development).unwrap();
        logger.info("kept in combined").unwrap();
        logger.error("kept in both").unwrap();
    }

    let combined = fs::read_to_string(temp_dir.path().join("combined.log")).unwrap();
    let errors = fs::read_to_string(temp_dir.path().join("error.log")).unwrap();

    assert_eq!(combined.lines().count(), 2);
    assert_eq!(errors.lines().count(), 1);
    assert!(errors.contains("ERROR - kept in both"));
    assert!(!combined.contains('\x1b'));
}

#[test]
fn test_config_file_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("logging.json");

    let mut config = LoggingConfig::default();
    config.label = "Worker".to_string();
    config.service = Some("jobs".to_string());
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = LoggingConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent_test.log");

    let logger = Logger::builder()
        .base_pipeline(Pipeline::new().stage(LevelTransform::new()))
        .sink(Sink::new(
            "file",
            "trace",
            Pipeline::new().stage(JsonFormatter::new()),
            Box::new(FileAppender::new(&log_file).expect("Failed to create appender")),
        ))
        .build()
        .unwrap();

    let mut handles = vec![];
    for thread_id in 0..5 {
        let logger = logger.child(Fields::new().with_field("thread", thread_id));
        handles.push(std::thread::spawn(move || {
            for i in 0..10 {
                logger
                    .info(format!("Thread {} - Message {}", thread_id, i))
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 50, "Should have 50 log entries from 5 threads * 10 messages");
    for line in lines {
        serde_json::from_str::<serde_json::Value>(line).expect("whole JSON record per line");
    }
}
