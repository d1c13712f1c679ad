//! Duration facility: one-shot timers and keyed profiles

use super::error::Result;
use super::level_registry::LogLevel;
use super::log_entry::LogRecord;
use super::logger::{EmitReport, Logger};
use std::time::{Duration, Instant};

/// Message used by [`TimerHandle::done_default`]
pub const TIMER_DONE_MESSAGE: &str = "Timer completed";

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// A running timer bound to the logger that started it
///
/// # Example
///
/// ```
/// use logpipe::prelude::*;
///
/// let logger = Logger::builder().build().unwrap();
/// let timer = logger.start_timer();
/// // ... work ...
/// timer.done("trace", "import finished").unwrap();
/// ```
#[derive(Debug)]
#[must_use = "a timer does nothing until `done` is called"]
pub struct TimerHandle {
    logger: Logger,
    started: Instant,
}

impl TimerHandle {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Emit `record` at `level` with the elapsed time as its duration
    pub fn done(self, level: impl AsRef<str>, record: impl Into<LogRecord>) -> Result<EmitReport> {
        let record = record.into().with_duration_ms(duration_ms(self.elapsed()));
        self.logger.log(level, record)
    }

    /// [`done`](Self::done) at `info`; an empty message gets a default one
    pub fn done_default(self, record: impl Into<LogRecord>) -> Result<EmitReport> {
        let mut record = record.into();
        if record.message.is_empty() && record.error.is_none() {
            record.message = TIMER_DONE_MESSAGE.to_string();
        }
        self.done(LogLevel::Info, record)
    }
}

impl Logger {
    /// Start a timer that emits through this logger when done
    pub fn start_timer(&self) -> TimerHandle {
        TimerHandle {
            logger: self.clone(),
            started: Instant::now(),
        }
    }

    /// Toggle the profile named `id`, emitting at `info` with `id` as the
    /// message when it stops
    ///
    /// The first call starts the profile and returns `Ok(None)`. The second
    /// emits with the elapsed duration and returns the report; a third call
    /// starts over.
    ///
    /// Profiles live in state shared with every child of the root logger.
    /// Starting and stopping are separate lock acquisitions, so two threads
    /// toggling the same id at once race: each may see the other's start.
    ///
    /// ```
    /// use logpipe::prelude::*;
    ///
    /// let logger = Logger::builder().build().unwrap();
    /// assert!(logger.profile("db-query").unwrap().is_none());
    /// assert!(logger.profile("db-query").unwrap().is_some());
    /// ```
    pub fn profile(&self, id: &str) -> Result<Option<EmitReport>> {
        self.profile_with(id, LogLevel::Info, id)
    }

    /// [`profile`](Self::profile) with an explicit level and record for the
    /// stopping emit
    pub fn profile_with(
        &self,
        id: &str,
        level: impl AsRef<str>,
        record: impl Into<LogRecord>,
    ) -> Result<Option<EmitReport>> {
        // Validate before touching the map so a bad level leaves it as is
        let level = self.registry().canonical(level.as_ref())?.to_string();

        let started = {
            let mut profiles = self.core.profiles.lock();
            match profiles.remove(id) {
                Some(started) => started,
                None => {
                    profiles.insert(id.to_string(), Instant::now());
                    return Ok(None);
                }
            }
        };

        let record = record.into().with_duration_ms(duration_ms(started.elapsed()));
        self.log(level, record).map(Some)
    }

    /// Whether a profile named `id` is running
    pub fn is_profiling(&self, id: &str) -> bool {
        self.core.profiles.lock().contains_key(id)
    }
}
