//! Style resolver -- picks the [`Style`] for every rendered token.
//!
//! Resolution for a token, first success wins:
//! 1. the highlight style, if the token matches the user's highlight pattern
//!    (field names use the key pattern, field values and messages the value pattern)
//! 2. a rule whose pattern equals the token
//! 3. the first wildcard rule matching the token, in declaration order
//! 4. the category's `default` rule, or a built-in baseline
//!
//! Field key and value styles are looked up by the field's name; all other
//! categories by the token text itself.

use std::borrow::Cow;

use prettylog_core::style::{
    DEFAULT_STYLE_KEY, HIGHLIGHT_STYLE_KEY, KeyValueStyle, Style, StyleRule, StyleTable,
    StyleTables,
};
use tracing::trace;

use crate::matcher::{matches_pattern, wildcard_matches};

/// Resolves token styles from a set of [`StyleTables`] and highlight patterns.
#[derive(Debug, Clone)]
pub struct StyleResolver {
    tables: StyleTables,
    highlight_key: Option<String>,
    highlight_value: Option<String>,
}

impl StyleResolver {
    pub fn new(tables: StyleTables) -> Self {
        Self {
            tables,
            highlight_key: None,
            highlight_value: None,
        }
    }

    pub fn with_highlights(mut self, key: Option<String>, value: Option<String>) -> Self {
        self.highlight_key = key;
        self.highlight_value = value;
        self
    }

    pub fn level(&self, level: &str) -> Cow<'_, Style> {
        let baseline = || Cow::Owned(level_baseline(level));
        match find_rule(&self.tables.level, level) {
            Some(style) => Cow::Borrowed(style),
            None => self
                .tables
                .level
                .default_style()
                .map_or_else(baseline, Cow::Borrowed),
        }
    }

    pub fn timestamp(&self, timestamp: &str) -> Cow<'_, Style> {
        resolve(&self.tables.timestamp, timestamp)
    }

    pub fn message(&self, message: &str) -> Cow<'_, Style> {
        if highlighted(self.highlight_value.as_deref(), message) {
            return self
                .tables
                .message
                .highlight_style()
                .map_or_else(|| Cow::Owned(Style::emphasis()), Cow::Borrowed);
        }
        resolve(&self.tables.message, message)
    }

    pub fn field_key(&self, name: &str) -> Cow<'_, Style> {
        if highlighted(self.highlight_key.as_deref(), name) {
            return self.field_highlight(|kv| kv.key.as_ref());
        }
        self.field_part(name, |kv| kv.key.as_ref())
    }

    pub fn field_value(&self, name: &str, value: &str) -> Cow<'_, Style> {
        if highlighted(self.highlight_value.as_deref(), value) {
            return self.field_highlight(|kv| kv.value.as_ref());
        }
        self.field_part(name, |kv| kv.value.as_ref())
    }

    fn field_highlight(&self, part: fn(&KeyValueStyle) -> Option<&Style>) -> Cow<'_, Style> {
        self.tables
            .field
            .highlight_style()
            .and_then(part)
            .map_or_else(|| Cow::Owned(Style::emphasis()), Cow::Borrowed)
    }

    fn field_part(
        &self,
        name: &str,
        part: fn(&KeyValueStyle) -> Option<&Style>,
    ) -> Cow<'_, Style> {
        let configured = find_rule(&self.tables.field, name).and_then(part);
        let style = configured.or_else(|| self.tables.field.default_style().and_then(part));
        style.map_or_else(|| Cow::Owned(Style::default()), Cow::Borrowed)
    }
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new(StyleTables::builtin())
    }
}

/// Colours used when the level table has no `default` rule.
fn level_baseline(level: &str) -> Style {
    if level.eq_ignore_ascii_case("warning") {
        Style::fg("yellow")
    } else if level.eq_ignore_ascii_case("error") || level.eq_ignore_ascii_case("fatal") {
        Style::fg("red")
    } else {
        Style::fg("cyan")
    }
}

fn highlighted(pattern: Option<&str>, token: &str) -> bool {
    pattern.is_some_and(|pattern| matches_pattern(pattern, token))
}

fn resolve<'a>(table: &'a StyleTable<Style>, token: &str) -> Cow<'a, Style> {
    find_rule(table, token)
        .or_else(|| table.default_style())
        .map_or_else(|| Cow::Owned(Style::default()), Cow::Borrowed)
}

/// Exact rule first, then the first wildcard rule in declaration order.
/// Reserved keys never match a token.
fn find_rule<'a, S>(table: &'a StyleTable<S>, token: &str) -> Option<&'a S> {
    let candidates = || table.rules().iter().filter(|rule| !is_reserved(rule));
    let rule = candidates()
        .find(|rule| rule.pattern.eq_ignore_ascii_case(token))
        .or_else(|| candidates().find(|rule| wildcard_matches(&rule.pattern, token)));
    if rule.is_none() {
        trace!(token, "no style rule, using default");
    }
    rule.map(|rule| &rule.style)
}

fn is_reserved<S>(rule: &StyleRule<S>) -> bool {
    rule.pattern == DEFAULT_STYLE_KEY || rule.pattern == HIGHLIGHT_STYLE_KEY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(tables: StyleTables) -> StyleResolver {
        StyleResolver::new(tables)
    }

    #[test]
    fn builtin_level_colours() {
        let styles = StyleResolver::default();
        assert_eq!(*styles.level("error"), Style::fg("red"));
        assert_eq!(*styles.level("warning"), Style::fg("yellow"));
        assert_eq!(*styles.level("info"), Style::fg("cyan"));
    }

    #[test]
    fn level_baseline_without_default_rule() {
        let styles = resolver(StyleTables::default());
        assert_eq!(*styles.level("fatal"), Style::fg("red"));
        assert_eq!(*styles.level("warning"), Style::fg("yellow"));
        assert_eq!(*styles.level("debug"), Style::fg("cyan"));
    }

    #[test]
    fn configured_default_replaces_level_baseline() {
        let tables = StyleTables {
            level: StyleTable::default().with_rule(DEFAULT_STYLE_KEY, Style::fg("white")),
            ..StyleTables::default()
        };
        assert_eq!(*resolver(tables).level("fatal"), Style::fg("white"));
    }

    #[test]
    fn exact_rule_beats_wildcard() {
        let tables = StyleTables {
            timestamp: StyleTable::default()
                .with_rule("2024*", Style::fg("green"))
                .with_rule("2024-01-15", Style::fg("magenta")),
            ..StyleTables::default()
        };
        let styles = resolver(tables);
        assert_eq!(*styles.timestamp("2024-01-15"), Style::fg("magenta"));
        assert_eq!(*styles.timestamp("2024-02-01"), Style::fg("green"));
        assert_eq!(*styles.timestamp("1999"), Style::default());
    }

    #[test]
    fn wildcards_scan_in_declaration_order() {
        let tables = StyleTables {
            message: StyleTable::default()
                .with_rule("*timeout*", Style::fg("red"))
                .with_rule("db*", Style::fg("blue")),
            ..StyleTables::default()
        };
        let styles = resolver(tables);
        assert_eq!(*styles.message("db timeout"), Style::fg("red"));
        assert_eq!(*styles.message("db ok"), Style::fg("blue"));
    }

    #[test]
    fn unmatched_message_uses_default() {
        let styles = StyleResolver::default();
        assert_eq!(*styles.message("anything"), Style::fg("white"));
    }

    #[test]
    fn value_highlight_applies_to_messages() {
        let styles = StyleResolver::default().with_highlights(None, Some("*boom*".to_owned()));
        assert_eq!(*styles.message("it went boom"), Style::emphasis());
        assert_eq!(*styles.message("fine"), Style::fg("white"));
    }

    #[test]
    fn field_defaults() {
        let styles = StyleResolver::default();
        assert_eq!(*styles.field_key("port"), Style::fg("yellow"));
        assert_eq!(*styles.field_value("port", "8080"), Style::fg("green"));
    }

    #[test]
    fn field_rules_match_by_name() {
        let tables = StyleTables::builtin_with(&StyleTables {
            field: StyleTable::default().with_rule(
                "trace.*",
                KeyValueStyle {
                    key: Some(Style::fg("magenta")),
                    value: None,
                },
            ),
            ..StyleTables::default()
        });
        let styles = resolver(tables);
        assert_eq!(*styles.field_key("trace.id"), Style::fg("magenta"));
        // no value style on the rule, so the default value style applies
        assert_eq!(*styles.field_value("trace.id", "abc"), Style::fg("green"));
    }

    #[test]
    fn highlight_wins_over_field_rules() {
        let tables = StyleTables::builtin_with(&StyleTables {
            field: StyleTable::default()
                .with_rule("user", KeyValueStyle::new(Style::fg("blue"), Style::fg("blue"))),
            ..StyleTables::default()
        });
        let styles = resolver(tables).with_highlights(Some("us*".to_owned()), Some("alice".to_owned()));
        assert_eq!(*styles.field_key("user"), Style::emphasis());
        assert_eq!(*styles.field_value("user", "alice"), Style::emphasis());
        assert_eq!(*styles.field_value("user", "bob"), Style::fg("blue"));
    }

    #[test]
    fn configured_highlight_style_is_used() {
        let custom = Style::fg("black").on("yellow");
        let tables = StyleTables {
            field: StyleTable::default().with_rule(
                HIGHLIGHT_STYLE_KEY,
                KeyValueStyle::new(custom.clone(), custom.clone()),
            ),
            ..StyleTables::default()
        };
        let styles = resolver(tables).with_highlights(Some("id".to_owned()), None);
        assert_eq!(*styles.field_key("id"), custom);
        assert_eq!(*styles.field_key("other"), Style::default());
    }

    #[test]
    fn reserved_keys_do_not_match_tokens() {
        let tables = StyleTables {
            message: StyleTable::default()
                .with_rule(DEFAULT_STYLE_KEY, Style::fg("white"))
                .with_rule(HIGHLIGHT_STYLE_KEY, Style::fg("red")),
            ..StyleTables::default()
        };
        assert_eq!(*resolver(tables).message("highlight"), Style::fg("white"));
    }
}
