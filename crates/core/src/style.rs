//! Style tables -- colour and emphasis settings per token category.
//!
//! Every category holds an ordered list of rules. A rule's `pattern` is either an
//! exact token, a wildcard pattern (`foo*`, `*foo`, `*foo*`) or one of the
//! reserved keys [`DEFAULT_STYLE_KEY`] and [`HIGHLIGHT_STYLE_KEY`]. Rule order is
//! the order wildcard patterns are tried in.
//!
//! ```toml
//! [[styles.level]]
//! pattern = "warning"
//! fg = "yellow"
//!
//! [[styles.field]]
//! pattern = "trace.*"
//! key = { fg = "magenta" }
//! value = { fg = "bright magenta", bold = true }
//! ```

use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rule applied to every token of a category before any other rule.
pub const DEFAULT_STYLE_KEY: &str = "default";

/// Rule applied when a token matches the user's highlight pattern.
pub const HIGHLIGHT_STYLE_KEY: &str = "highlight";

/// Colour and emphasis of one rendered token. Unset attributes are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Foreground colour name (`red`, `bright blue`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    /// Background colour name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

impl Style {
    /// Style with only a foreground colour.
    pub fn fg(color: impl Into<String>) -> Self {
        Self {
            fg: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn on(mut self, color: impl Into<String>) -> Self {
        self.bg = Some(color.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    /// Bold, italic and underlined red, used for highlights when none is configured.
    pub fn emphasis() -> Self {
        Self::fg("red").bold().italic().underline()
    }

    /// Paints `text` with this style.
    ///
    /// Colour names were checked by [`Style::validate`]; an unparseable name here
    /// is skipped rather than guessed.
    pub fn paint(&self, text: &str) -> ColoredString {
        let mut painted = ColoredString::from(text);
        if let Some(color) = self.bg.as_deref().and_then(parse_color) {
            painted = painted.on_color(color);
        }
        if let Some(color) = self.fg.as_deref().and_then(parse_color) {
            painted = painted.color(color);
        }
        if self.bold == Some(true) {
            painted = painted.bold();
        }
        if self.underline == Some(true) {
            painted = painted.underline();
        }
        if self.italic == Some(true) {
            painted = painted.italic();
        }
        painted
    }

    /// Rejects unknown colour names. `field` names the config location for the error.
    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        for (attr, name) in [("fg", &self.fg), ("bg", &self.bg)] {
            if let Some(name) = name {
                if parse_color(name).is_none() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{field}.{attr}"),
                        reason: format!("unknown colour '{name}'"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Separate styles for a field's name and its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Style>,
}

impl KeyValueStyle {
    pub fn new(key: Style, value: Style) -> Self {
        Self {
            key: Some(key),
            value: Some(value),
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if let Some(key) = &self.key {
            key.validate(&format!("{field}.key"))?;
        }
        if let Some(value) = &self.value {
            value.validate(&format!("{field}.value"))?;
        }
        Ok(())
    }
}

/// One entry of a style table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule<S> {
    /// Exact token, wildcard pattern or reserved key
    pub pattern: String,
    #[serde(flatten)]
    pub style: S,
}

/// Declaration-ordered style rules for one token category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleTable<S> {
    rules: Vec<StyleRule<S>>,
}

impl<S> Default for StyleTable<S> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<S> StyleTable<S> {
    /// Appends a rule, or replaces the style of an existing rule with the same pattern.
    pub fn with_rule(mut self, pattern: impl Into<String>, style: S) -> Self {
        self.set(pattern.into(), style);
        self
    }

    fn set(&mut self, pattern: String, style: S) {
        match self.rules.iter_mut().find(|rule| rule.pattern == pattern) {
            Some(rule) => rule.style = style,
            None => self.rules.push(StyleRule { pattern, style }),
        }
    }

    pub fn rules(&self) -> &[StyleRule<S>] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The exact-pattern rule for `pattern`, reserved keys included.
    pub fn get(&self, pattern: &str) -> Option<&S> {
        self.rules
            .iter()
            .find(|rule| rule.pattern == pattern)
            .map(|rule| &rule.style)
    }

    pub fn default_style(&self) -> Option<&S> {
        self.get(DEFAULT_STYLE_KEY)
    }

    pub fn highlight_style(&self) -> Option<&S> {
        self.get(HIGHLIGHT_STYLE_KEY)
    }
}

impl<S: Clone> StyleTable<S> {
    /// Layers `overrides` on top of `self`: same-pattern rules are replaced in
    /// place, new patterns are appended in their declared order.
    pub fn merged(&self, overrides: &StyleTable<S>) -> Self {
        let mut merged = self.clone();
        for rule in &overrides.rules {
            merged.set(rule.pattern.clone(), rule.style.clone());
        }
        merged
    }
}

/// Style tables for all token categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTables {
    pub level: StyleTable<Style>,
    pub message: StyleTable<Style>,
    pub timestamp: StyleTable<Style>,
    pub field: StyleTable<KeyValueStyle>,
}

impl StyleTables {
    /// Built-in look: cyan levels with yellow warnings and red errors, white
    /// messages, blue timestamps, yellow field names and green values.
    pub fn builtin() -> Self {
        Self {
            level: StyleTable::default()
                .with_rule(DEFAULT_STYLE_KEY, Style::fg("cyan"))
                .with_rule("warning", Style::fg("yellow"))
                .with_rule("error", Style::fg("red"))
                .with_rule("err", Style::fg("red")),
            message: StyleTable::default().with_rule(DEFAULT_STYLE_KEY, Style::fg("white")),
            timestamp: StyleTable::default().with_rule(DEFAULT_STYLE_KEY, Style::fg("blue")),
            field: StyleTable::default()
                .with_rule(
                    DEFAULT_STYLE_KEY,
                    KeyValueStyle::new(Style::fg("yellow"), Style::fg("green")),
                )
                .with_rule(
                    HIGHLIGHT_STYLE_KEY,
                    KeyValueStyle::new(Style::emphasis(), Style::emphasis()),
                ),
        }
    }

    /// Built-in tables with `overrides` layered on top.
    pub fn builtin_with(overrides: &StyleTables) -> Self {
        let builtin = Self::builtin();
        Self {
            level: builtin.level.merged(&overrides.level),
            message: builtin.message.merged(&overrides.message),
            timestamp: builtin.timestamp.merged(&overrides.timestamp),
            field: builtin.field.merged(&overrides.field),
        }
    }

    /// Checks every colour name in every table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (category, table) in [
            ("level", &self.level),
            ("message", &self.message),
            ("timestamp", &self.timestamp),
        ] {
            for (idx, rule) in table.rules().iter().enumerate() {
                rule.style.validate(&format!("styles.{category}[{idx}]"))?;
            }
        }
        for (idx, rule) in self.field.rules().iter().enumerate() {
            rule.style.validate(&format!("styles.field[{idx}]"))?;
        }
        Ok(())
    }
}

fn parse_color(name: &str) -> Option<Color> {
    name.parse::<Color>().ok()
}
