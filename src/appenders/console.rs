//! Console appender implementation

use crate::core::{Appender, Result};
use std::io::{self, IsTerminal, Write};

pub struct ConsoleAppender {
    use_colors: Option<bool>,
}

impl ConsoleAppender {
    /// Colors follow whether stdout is a terminal
    pub fn new() -> Self {
        Self { use_colors: None }
    }

    /// Force colors on or off regardless of stdout
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors: Some(use_colors),
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn write(&mut self, record: &[u8]) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }

    fn is_interactive(&self) -> bool {
        self.use_colors
            .unwrap_or_else(|| io::stdout().is_terminal())
    }
}
