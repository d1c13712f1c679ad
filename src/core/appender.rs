//! Appender trait: the write primitive behind a sink

use super::error::Result;

pub trait Appender: Send {
    /// Write one serialized record
    fn write(&mut self, record: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;

    /// Whether the target renders terminal styling
    fn is_interactive(&self) -> bool {
        false
    }
}
