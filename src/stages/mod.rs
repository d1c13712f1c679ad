//! Built-in pipeline stages

pub mod colorize;
pub mod custom;
pub mod json;
pub mod strip;
pub mod text;
pub mod transform;

pub use colorize::Colorizer;
pub use custom::FnStage;
pub use json::JsonFormatter;
pub use strip::{strip_ansi, StripStyling};
pub use text::{TextFormatter, DEFAULT_SERVICE};
pub use transform::{LevelTransform, REDACTED_MESSAGE};
