//! Terminal styling specifications
//!
//! A [`Style`] is parsed from a space-separated spec string such as
//! `"bold red"`, `"italic magenta"` or `"white blueBG"`. The explicit
//! `"none"` spec produces the neutral style, which renders text unchanged.
//!
//! A [`StyleTable`] maps every rendered part of a text record to a style.

use super::error::{LoggerError, Result};
use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

static UNSTYLED: Style = Style {
    spec: String::new(),
    fg: None,
    bg: None,
    modifiers: Vec::new(),
};

/// Spec strings that resolve to the neutral style
const NEUTRAL_SPECS: [&str; 2] = ["none", "neutral"];

/// Text attributes a spec may combine with its colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Bold,
    Dimmed,
    Italic,
    Underline,
    Blink,
    Reversed,
    Hidden,
    Strikethrough,
}

impl Modifier {
    fn from_token(token: &str) -> Option<Modifier> {
        match token {
            "bold" => Some(Modifier::Bold),
            "dim" | "dimmed" => Some(Modifier::Dimmed),
            "italic" => Some(Modifier::Italic),
            "underline" => Some(Modifier::Underline),
            "blink" => Some(Modifier::Blink),
            "inverse" | "reversed" => Some(Modifier::Reversed),
            "hidden" => Some(Modifier::Hidden),
            "strikethrough" => Some(Modifier::Strikethrough),
            _ => None,
        }
    }

    fn apply(self, text: ColoredString) -> ColoredString {
        match self {
            Modifier::Bold => text.bold(),
            Modifier::Dimmed => text.dimmed(),
            Modifier::Italic => text.italic(),
            Modifier::Underline => text.underline(),
            Modifier::Blink => text.blink(),
            Modifier::Reversed => text.reversed(),
            Modifier::Hidden => text.hidden(),
            Modifier::Strikethrough => text.strikethrough(),
        }
    }
}

/// Parsed terminal style
///
/// Painting goes through [`colored`], so its global switches apply:
/// `NO_COLOR`, `CLICOLOR_FORCE` and `colored::control::set_override`.
///
/// # Examples
///
/// ```
/// use logpipe::core::Style;
///
/// colored::control::set_override(true);
///
/// let style: Style = "bold red".parse().unwrap();
/// assert_eq!(style.paint("boom"), "\x1b[1;31mboom\x1b[0m");
///
/// let neutral = Style::neutral();
/// assert_eq!(neutral.paint("plain"), "plain");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Style {
    spec: String,
    fg: Option<Color>,
    bg: Option<Color>,
    modifiers: Vec<Modifier>,
}

impl Style {
    /// The explicit "no styling" value
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            spec: NEUTRAL_SPECS[0].to_string(),
            fg: None,
            bg: None,
            modifiers: Vec::new(),
        }
    }

    /// Parse a style spec string
    ///
    /// When a spec names several foreground (or background) colors, the
    /// last one wins.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(LoggerError::config(
                "Style",
                "empty style spec; use \"none\" for no styling",
            ));
        }
        if NEUTRAL_SPECS.contains(&trimmed.to_lowercase().as_str()) {
            return Ok(Self::neutral());
        }

        let mut style = Self {
            spec: trimmed.to_string(),
            fg: None,
            bg: None,
            modifiers: Vec::new(),
        };
        let mut tokens = trimmed.split_whitespace();
        while let Some(token) = tokens.next() {
            let lower = token.to_lowercase();
            if let Some(modifier) = Modifier::from_token(&lower) {
                style.modifiers.push(modifier);
                continue;
            }

            // "bright" always pairs with the following color name
            let (name, background) = if lower == "bright" {
                let next = tokens.next().ok_or_else(|| {
                    LoggerError::config("Style", format!("'bright' without a color in '{}'", spec))
                })?;
                let (color, bg) = split_background(&next.to_lowercase());
                (format!("bright {}", color), bg)
            } else {
                split_background(&lower)
            };

            let color = resolve_color(&name).ok_or_else(|| {
                LoggerError::config("Style", format!("unknown style token '{}' in '{}'", token, spec))
            })?;
            if background {
                style.bg = Some(color);
            } else {
                style.fg = Some(color);
            }
        }

        Ok(style)
    }

    /// Whether this style leaves text untouched
    pub fn is_neutral(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.modifiers.is_empty()
    }

    /// The spec string this style was parsed from
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Wrap `text` in this style
    ///
    /// Returns `text` unchanged when the style is neutral or `colored` has
    /// colorization switched off.
    pub fn paint(&self, text: &str) -> String {
        if self.is_neutral() {
            return text.to_string();
        }

        let mut painted = text.normal();
        if let Some(fg) = self.fg {
            painted = painted.color(fg);
        }
        if let Some(bg) = self.bg {
            painted = painted.on_color(bg);
        }
        for modifier in &self.modifiers {
            painted = modifier.apply(painted);
        }
        painted.to_string()
    }
}

/// Splits a `redbg` style token into its color and a background flag
fn split_background(token: &str) -> (String, bool) {
    match token.strip_suffix("bg") {
        Some(color) if !color.is_empty() => (color.to_string(), true),
        _ => (token.to_string(), false),
    }
}

fn resolve_color(name: &str) -> Option<Color> {
    match name {
        "gray" | "grey" => Some(Color::BrightBlack),
        other => other.parse().ok(),
    }
}

impl FromStr for Style {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Style::parse(s)
    }
}

impl TryFrom<String> for Style {
    type Error = LoggerError;

    fn try_from(value: String) -> Result<Self> {
        Style::parse(&value)
    }
}

impl From<Style> for String {
    fn from(style: Style) -> Self {
        style.spec
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec)
    }
}

/// The parts of a human-readable record that can be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Timestamp,
    Label,
    Level,
    Message,
    Duration,
    Service,
}

impl Part {
    pub const ALL: [Part; 6] = [
        Part::Timestamp,
        Part::Label,
        Part::Level,
        Part::Message,
        Part::Duration,
        Part::Service,
    ];

    /// Key used for this part in a style table
    pub fn key(&self) -> &'static str {
        match self {
            Part::Timestamp => "timestamp",
            Part::Label => "label",
            Part::Level => "level",
            Part::Message => "message",
            Part::Duration => "durationMs",
            Part::Service => "service",
        }
    }

    fn from_key(key: &str) -> Option<Part> {
        Part::ALL.into_iter().find(|part| part.key() == key)
    }
}

/// Style per rendered part
///
/// Every part must be present. A part that should stay plain is mapped to
/// the neutral style (`"none"`), never left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Style>", into = "BTreeMap<String, Style>")]
pub struct StyleTable {
    styles: BTreeMap<String, Style>,
}

impl StyleTable {
    /// Build a table from parsed styles, requiring every part
    pub fn new(styles: BTreeMap<String, Style>) -> Result<Self> {
        for key in styles.keys() {
            if Part::from_key(key).is_none() {
                return Err(LoggerError::config(
                    "StyleTable",
                    format!("'{}' is not a styleable part", key),
                ));
            }
        }
        for part in Part::ALL {
            if !styles.contains_key(part.key()) {
                return Err(LoggerError::config(
                    "StyleTable",
                    format!("missing style for '{}'; use \"none\" for no styling", part.key()),
                ));
            }
        }
        Ok(Self { styles })
    }

    /// Build a table from `(part key, spec string)` pairs
    pub fn from_specs<'a, I>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let styles = specs
            .into_iter()
            .map(|(key, spec)| Style::parse(spec).map(|style| (key.to_string(), style)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Self::new(styles)
    }

    pub fn style(&self, part: Part) -> &Style {
        self.styles.get(part.key()).unwrap_or(&UNSTYLED)
    }

    pub fn paint(&self, part: Part, text: &str) -> String {
        self.style(part).paint(text)
    }
}

impl Default for StyleTable {
    /// Part colors of the standard development console
    fn default() -> Self {
        let styles = [
            (Part::Label, "green"),
            (Part::Timestamp, "white"),
            (Part::Level, "none"),
            (Part::Message, "none"),
            (Part::Duration, "italic magenta"),
            (Part::Service, "yellow"),
        ]
        .into_iter()
        .map(|(part, spec)| {
            (
                part.key().to_string(),
                Style::parse(spec).unwrap_or_else(|_| Style::neutral()),
            )
        })
        .collect();
        Self { styles }
    }
}

impl TryFrom<BTreeMap<String, Style>> for StyleTable {
    type Error = LoggerError;

    fn try_from(styles: BTreeMap<String, Style>) -> Result<Self> {
        StyleTable::new(styles)
    }
}

impl From<StyleTable> for BTreeMap<String, Style> {
    fn from(table: StyleTable) -> Self {
        table.styles
    }
}
