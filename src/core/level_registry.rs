//! Level definitions and the level registry
//!
//! The [`LevelRegistry`] is the single source of truth for level ordering.
//! Priority 0 is the most severe level. Registration happens once, when the
//! registry is constructed; there is no way to add a level afterwards.

use super::error::{LoggerError, Result};
use super::style::Style;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One configured level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub priority: u32,
    pub style: Style,
}

impl LevelSpec {
    pub fn new(name: impl Into<String>, priority: u32, style: Style) -> Self {
        Self {
            name: name.into(),
            priority,
            style,
        }
    }
}

/// Ordered, immutable set of levels
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    // Sorted by priority, most severe first
    levels: Vec<LevelSpec>,
}

impl LevelRegistry {
    /// Build a registry, rejecting duplicate names or priorities
    pub fn new(mut levels: Vec<LevelSpec>) -> Result<Self> {
        if levels.is_empty() {
            return Err(LoggerError::config("LevelRegistry", "no levels registered"));
        }

        levels.sort_by_key(|spec| spec.priority);
        for (idx, spec) in levels.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(LoggerError::config("LevelRegistry", "empty level name"));
            }
            for other in &levels[idx + 1..] {
                if other.priority == spec.priority {
                    return Err(LoggerError::config(
                        "LevelRegistry",
                        format!(
                            "levels '{}' and '{}' share priority {}",
                            spec.name, other.name, spec.priority
                        ),
                    ));
                }
                if other.name.eq_ignore_ascii_case(&spec.name) {
                    return Err(LoggerError::config(
                        "LevelRegistry",
                        format!("level '{}' registered twice", spec.name),
                    ));
                }
            }
        }

        Ok(Self { levels })
    }

    fn find(&self, name: &str) -> Result<&LevelSpec> {
        self.levels
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| LoggerError::unknown_level(name))
    }

    /// Priority of a level; lower is more severe
    pub fn priority(&self, name: &str) -> Result<u32> {
        self.find(name).map(|spec| spec.priority)
    }

    /// `true` when `level` is at least as severe as `threshold`
    pub fn is_at_least(&self, level: &str, threshold: &str) -> Result<bool> {
        Ok(self.priority(level)? <= self.priority(threshold)?)
    }

    /// Registered spelling of a level name (lookups ignore ASCII case)
    pub fn canonical(&self, name: &str) -> Result<&str> {
        self.find(name).map(|spec| spec.name.as_str())
    }

    /// Display style of a level
    pub fn style(&self, name: &str) -> Result<&Style> {
        self.find(name).map(|spec| &spec.style)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Level names, most severe first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|spec| spec.name.as_str())
    }

    /// The least severe registered level
    pub fn most_verbose(&self) -> &str {
        self.levels
            .last()
            .map(|spec| spec.name.as_str())
            .unwrap_or_default()
    }

    pub fn specs(&self) -> &[LevelSpec] {
        &self.levels
    }
}

impl Default for LevelRegistry {
    /// The six standard levels with their display colors
    fn default() -> Self {
        let levels = LogLevel::ALL
            .iter()
            .map(|level| level.default_spec())
            .collect();
        Self { levels }
    }
}

/// Compile-time enumeration of the standard levels
///
/// Used by the shorthand methods on [`Logger`](crate::core::Logger). The
/// enumeration is ordered most severe first, matching registry priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Registry name of this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    fn default_spec(&self) -> LevelSpec {
        let (priority, style) = match self {
            LogLevel::Fatal => (0, "bold red"),
            LogLevel::Error => (1, "red"),
            LogLevel::Warn => (2, "yellow"),
            LogLevel::Info => (3, "green"),
            LogLevel::Debug => (4, "blue"),
            LogLevel::Trace => (5, "cyan"),
        };
        LevelSpec {
            name: self.as_str().to_string(),
            priority,
            style: Style::parse(style).unwrap_or_else(|_| Style::neutral()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggerError::unknown_level(s)),
        }
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = LevelRegistry::default();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["fatal", "error", "warn", "info", "debug", "trace"]);
        assert_eq!(registry.most_verbose(), "trace");
    }

    #[test]
    fn test_priority_lookup_ignores_case() {
        let registry = LevelRegistry::default();
        assert_eq!(registry.priority("info").unwrap(), 3);
        assert_eq!(registry.priority("INFO").unwrap(), 3);
        assert_eq!(registry.canonical("WARN").unwrap(), "warn");
    }

    #[test]
    fn test_unknown_level() {
        let registry = LevelRegistry::default();
        let err = registry.priority("verbose").unwrap_err();
        assert!(matches!(err, LoggerError::UnknownLevel { .. }));
        assert!(registry.is_at_least("silly", "info").is_err());
    }

    #[test]
    fn test_is_at_least() {
        let registry = LevelRegistry::default();
        assert!(registry.is_at_least("fatal", "warn").unwrap());
        assert!(registry.is_at_least("warn", "warn").unwrap());
        assert!(!registry.is_at_least("debug", "info").unwrap());
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let levels = vec![
            LevelSpec::new("high", 0, Style::neutral()),
            LevelSpec::new("low", 0, Style::neutral()),
        ];
        assert!(matches!(
            LevelRegistry::new(levels),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let levels = vec![
            LevelSpec::new("notice", 0, Style::neutral()),
            LevelSpec::new("NOTICE", 1, Style::neutral()),
        ];
        assert!(LevelRegistry::new(levels).is_err());
        assert!(LevelRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn test_custom_registry_sorted_by_priority() {
        let levels = vec![
            LevelSpec::new("chatty", 9, Style::neutral()),
            LevelSpec::new("alarm", 1, Style::parse("bold red").unwrap()),
        ];
        let registry = LevelRegistry::new(levels).unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["alarm", "chatty"]);
        assert_eq!(registry.style("alarm").unwrap().spec(), "bold red");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
