//! Filter specification and its construction from raw flag values.

use prettylog_core::types::{Severity, SeverityTable};
use tracing::debug;

use crate::error::LogPipelineError;
use crate::matcher::PatternSet;
use crate::truncate::Truncate;

/// Field name of a where-clause that searches every field and the message.
pub const ANY_FIELD: &str = "*";

/// Severity predicate. Only one bound is active: exact beats minimum beats maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFilter {
    Exact(Severity),
    AtLeast(Severity),
    AtMost(Severity),
}

impl LevelFilter {
    /// `entry` is `None` when the entry's level is not in the severity table.
    /// Such entries only pass a maximum bound.
    pub fn accepts(self, entry: Option<Severity>) -> bool {
        match self {
            Self::Exact(wanted) => entry == Some(wanted),
            Self::AtLeast(min) => entry.is_some_and(|severity| severity >= min),
            Self::AtMost(max) => entry.is_none_or(|severity| severity <= max),
        }
    }
}

/// One `--where` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    /// Data field name, or [`ANY_FIELD`]
    pub field: String,
    pub value: String,
}

impl WhereClause {
    /// Parses `FIELD=VALUE`, or a bare `VALUE` searched in every field.
    pub fn parse(clause: &str) -> Result<Self, LogPipelineError> {
        let parts: Vec<&str> = clause.split('=').collect();
        match parts.as_slice() {
            [value] => Ok(Self {
                field: ANY_FIELD.to_owned(),
                value: (*value).to_owned(),
            }),
            [field, _] if field.is_empty() => Err(LogPipelineError::FilterSpec {
                flag: "where".to_owned(),
                reason: format!("clause '{clause}' has an empty field name"),
            }),
            [field, value] => Ok(Self {
                field: (*field).to_owned(),
                value: (*value).to_owned(),
            }),
            _ => Err(LogPipelineError::FilterSpec {
                flag: "where".to_owned(),
                reason: format!(
                    "clause '{clause}' must be FIELD=VALUE, VALUE, or a comma separated list of those"
                ),
            }),
        }
    }

    pub fn is_any_field(&self) -> bool {
        self.field == ANY_FIELD
    }
}

/// Everything that decides which lines and fields are shown. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Data fields to show; when non-empty, `excluded` is ignored
    pub included: PatternSet,
    /// Data fields to hide
    pub excluded: PatternSet,
    pub level: Option<LevelFilter>,
    /// Alternatives: a line passes if any clause passes
    pub where_clauses: Vec<WhereClause>,
    pub truncate: Option<Truncate>,
    pub highlight_key: Option<String>,
    pub highlight_value: Option<String>,
    /// Message patterns of lines that are never shown
    pub ignored_messages: PatternSet,
}

impl FilterSpec {
    pub fn builder() -> FilterSpecBuilder {
        FilterSpecBuilder::default()
    }
}

/// Collects raw flag values and validates them into a [`FilterSpec`].
///
/// ```ignore
/// let spec = FilterSpec::builder()
///     .fields("trace.*,status")
///     .min_level("warning")
///     .where_clauses("status=500")
///     .build(&SeverityTable::default())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterSpecBuilder {
    fields: Vec<String>,
    except: Vec<String>,
    level: Option<String>,
    min_level: Option<String>,
    max_level: Option<String>,
    where_clauses: Option<String>,
    truncate: Option<String>,
    highlight_key: Option<String>,
    highlight_value: Option<String>,
    ignored_messages: Vec<String>,
}

impl FilterSpecBuilder {
    /// Adds a comma separated list of included field patterns. May be called repeatedly.
    pub fn fields(mut self, list: &str) -> Self {
        self.fields.extend(split_list(list));
        self
    }

    /// Adds one included field pattern.
    pub fn field(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.fields.push(pattern);
        }
        self
    }

    /// Adds a comma separated list of excluded field patterns.
    pub fn except(mut self, list: &str) -> Self {
        self.except.extend(split_list(list));
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = non_empty(level.into());
        self
    }

    pub fn min_level(mut self, level: impl Into<String>) -> Self {
        self.min_level = non_empty(level.into());
        self
    }

    pub fn max_level(mut self, level: impl Into<String>) -> Self {
        self.max_level = non_empty(level.into());
        self
    }

    /// Raw `--where` value: comma separated clauses.
    pub fn where_clauses(mut self, clauses: impl Into<String>) -> Self {
        self.where_clauses = non_empty(clauses.into());
        self
    }

    /// Raw `--trunc` value.
    pub fn truncate(mut self, rule: impl Into<String>) -> Self {
        self.truncate = non_empty(rule.into());
        self
    }

    pub fn highlight_key(mut self, pattern: impl Into<String>) -> Self {
        self.highlight_key = non_empty(pattern.into());
        self
    }

    pub fn highlight_value(mut self, pattern: impl Into<String>) -> Self {
        self.highlight_value = non_empty(pattern.into());
        self
    }

    pub fn ignore_messages<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_messages
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Validates every flag against `severities`. Fails on the first bad value.
    pub fn build(self, severities: &SeverityTable) -> Result<FilterSpec, LogPipelineError> {
        let exact = resolve_level("level", self.level.as_deref(), severities)?;
        let min = resolve_level("min-level", self.min_level.as_deref(), severities)?;
        let max = resolve_level("max-level", self.max_level.as_deref(), severities)?;
        let level = exact
            .map(LevelFilter::Exact)
            .or(min.map(LevelFilter::AtLeast))
            .or(max.map(LevelFilter::AtMost));

        let where_clauses = match self.where_clauses.as_deref() {
            Some(raw) => raw
                .split(',')
                .map(WhereClause::parse)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let truncate = self
            .truncate
            .as_deref()
            .map(str::parse::<Truncate>)
            .transpose()?;

        let spec = FilterSpec {
            included: PatternSet::new(self.fields),
            excluded: PatternSet::new(self.except),
            level,
            where_clauses,
            truncate,
            highlight_key: self.highlight_key,
            highlight_value: self.highlight_value,
            ignored_messages: PatternSet::new(self.ignored_messages),
        };
        debug!(?spec, "filter spec built");
        Ok(spec)
    }
}

fn resolve_level(
    flag: &str,
    level: Option<&str>,
    severities: &SeverityTable,
) -> Result<Option<Severity>, LogPipelineError> {
    let Some(level) = level else {
        return Ok(None);
    };
    severities
        .severity_of(level)
        .map(Some)
        .ok_or_else(|| LogPipelineError::UnknownLevel {
            flag: flag.to_owned(),
            level: level.to_owned(),
            known: severities.names().join(", "),
        })
}

fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truncate::TruncateLimit;

    fn severities() -> SeverityTable {
        SeverityTable::default()
    }

    fn sev(value: u8) -> Severity {
        Severity::new(value).unwrap()
    }

    #[test]
    fn empty_builder_filters_nothing() {
        let spec = FilterSpec::builder().build(&severities()).unwrap();
        assert!(spec.level.is_none());
        assert!(spec.where_clauses.is_empty());
        assert!(spec.included.is_empty());
        assert!(spec.ignored_messages.is_empty());
    }

    #[test]
    fn exact_level_takes_precedence() {
        let spec = FilterSpec::builder()
            .level("error")
            .min_level("warning")
            .build(&severities())
            .unwrap();
        assert_eq!(spec.level, Some(LevelFilter::Exact(sev(5))));
    }

    #[test]
    fn min_level_beats_max_level() {
        let spec = FilterSpec::builder()
            .min_level("info")
            .max_level("error")
            .build(&severities())
            .unwrap();
        assert_eq!(spec.level, Some(LevelFilter::AtLeast(sev(3))));
    }

    #[test]
    fn level_names_are_case_insensitive() {
        let spec = FilterSpec::builder()
            .max_level("WARNING")
            .build(&severities())
            .unwrap();
        assert_eq!(spec.level, Some(LevelFilter::AtMost(sev(4))));
    }

    #[test]
    fn unknown_level_fails_at_build_time() {
        let err = FilterSpec::builder()
            .level("error")
            .min_level("warn")
            .build(&severities())
            .unwrap_err();
        match err {
            LogPipelineError::UnknownLevel { flag, level, known } => {
                assert_eq!(flag, "min-level");
                assert_eq!(level, "warn");
                assert!(known.starts_with("trace, debug"));
            }
            other => panic!("expected UnknownLevel, got {other:?}"),
        }
    }

    #[test]
    fn empty_level_flag_is_unset() {
        let spec = FilterSpec::builder().level("").build(&severities()).unwrap();
        assert!(spec.level.is_none());
    }

    #[test]
    fn level_filter_bounds() {
        assert!(LevelFilter::Exact(sev(5)).accepts(Some(sev(5))));
        assert!(!LevelFilter::Exact(sev(5)).accepts(Some(sev(6))));
        assert!(LevelFilter::AtLeast(sev(4)).accepts(Some(sev(7))));
        assert!(!LevelFilter::AtLeast(sev(4)).accepts(Some(sev(3))));
        assert!(LevelFilter::AtMost(sev(4)).accepts(Some(sev(1))));
        assert!(!LevelFilter::AtMost(sev(4)).accepts(Some(sev(5))));
    }

    #[test]
    fn unknown_entry_level_only_passes_max() {
        assert!(!LevelFilter::Exact(sev(3)).accepts(None));
        assert!(!LevelFilter::AtLeast(sev(1)).accepts(None));
        assert!(LevelFilter::AtMost(sev(3)).accepts(None));
    }

    #[test]
    fn where_clauses_parse_in_order() {
        let spec = FilterSpec::builder()
            .where_clauses("trace.id=abc,timeout,status=500")
            .build(&severities())
            .unwrap();
        let fields: Vec<&str> = spec.where_clauses.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["trace.id", ANY_FIELD, "status"]);
        assert!(spec.where_clauses[1].is_any_field());
        assert_eq!(spec.where_clauses[1].value, "timeout");
    }

    #[test]
    fn where_clause_with_two_equals_is_rejected() {
        let err = FilterSpec::builder()
            .where_clauses("a=b=c")
            .build(&severities())
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid --where"));
    }

    #[test]
    fn where_clause_with_empty_field_is_rejected() {
        assert!(WhereClause::parse("=x").is_err());
    }

    #[test]
    fn where_clause_may_require_empty_value() {
        let clause = WhereClause::parse("user=").unwrap();
        assert_eq!(clause.field, "user");
        assert_eq!(clause.value, "");
    }

    #[test]
    fn field_lists_merge() {
        let spec = FilterSpec::builder()
            .field("port")
            .fields("trace.*, status,")
            .except("secret")
            .build(&severities())
            .unwrap();
        assert_eq!(spec.included.patterns(), &["port", "trace.*", "status"]);
        assert_eq!(spec.excluded.patterns(), &["secret"]);
    }

    #[test]
    fn truncate_is_parsed() {
        let spec = FilterSpec::builder()
            .truncate("message=10")
            .build(&severities())
            .unwrap();
        let rule = spec.truncate.unwrap();
        assert_eq!(rule.field(), "message");
        assert_eq!(rule.limit(), &TruncateLimit::Chars(10));
    }

    #[test]
    fn bad_truncate_fails_build() {
        let err = FilterSpec::builder()
            .truncate("message=-1")
            .build(&severities())
            .unwrap_err();
        assert!(matches!(err, LogPipelineError::FilterSpec { .. }));
    }

    #[test]
    fn ignored_messages_and_highlights_are_kept() {
        let spec = FilterSpec::builder()
            .ignore_messages(["health check"])
            .highlight_key("*id")
            .build(&severities())
            .unwrap();
        assert!(spec.ignored_messages.matches("health check"));
        assert_eq!(spec.highlight_key.as_deref(), Some("*id"));
        assert!(spec.highlight_value.is_none());
    }
}
