//! Pipeline demo
//!
//! Emits at every level through the standard assembly, with timers,
//! profiles, a child logger and a redacted event. Logs go to the console
//! and to `combined.log` / `error.log` under a `logpipe-demo` directory in
//! the system temp dir.
//!
//! Run with: cargo run --example pipeline_demo
//! Set `APP_ENV=production` for JSON output.

use logpipe::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    let log_dir = std::env::temp_dir().join("logpipe-demo");
    std::fs::create_dir_all(&log_dir)?;

    let env = Environment::detect();
    let mut config = LoggingConfig::default().with_log_dir(&log_dir);
    config.service = Some("demo".to_string());

    let logger = Logger::from_config(&config, env)?;
    println!("=== logpipe demo ({:?}) ===\n", env);

    logger.profile("test")?;
    let timer = logger.start_timer();

    logger.trace("Trace message")?;
    logger.debug("Debug message")?;
    logger.info("Info message")?;
    logger.warn("Warn message")?;
    logger.error("Error message")?;
    logger.fatal("Fatal message")?;

    // Never reaches a sink; a placeholder is written instead
    logger.debug(
        LogRecord::new("Card 4111 1111 1111 1111 charged")
            .with_field("card", "4111 1111 1111 1111")
            .private(),
    )?;

    thread::sleep(Duration::from_millis(20));
    logger.profile_with("test", LogLevel::Debug, "Profile finished")?;
    timer.done(LogLevel::Info, "Timer finished")?;

    let child = logger.child(
        Fields::new()
            .with_field("service", "billing")
            .with_field("context", "invoices"),
    );
    child.info(LogRecord::new("Invoice created").with_field("invoiceId", 42))?;

    // Error with an error attached is promoted to fatal
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "invoice template missing");
    child.error(
        LogRecord::new("Rendering failed")
            .with_error(ErrorInfo::from_error(&io_err).with_stack("render_invoice\nsend_invoice")),
    )?;

    logger.with_label("Worker").info("Labelled message")?;

    logger.flush()?;

    let metrics = logger.metrics();
    println!(
        "\nemitted={} delivered={} replaced={} suppressed={} sink_failures={}",
        metrics.emitted(),
        metrics.delivered(),
        metrics.replaced(),
        metrics.suppressed(),
        metrics.sink_failures()
    );
    println!("Log files written to {}", log_dir.display());

    Ok(())
}
