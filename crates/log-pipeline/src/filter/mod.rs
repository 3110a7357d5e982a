//! Filter engine -- show/hide decisions for lines and data fields.
//!
//! A parsed line is shown when it passes, in order:
//! 1. the level predicate ([`LevelFilter`]),
//! 2. the where predicate (any clause matching is enough),
//! 3. the message ignore list.
//!
//! Unparsed lines are never filtered.
//!
//! # Architecture
//! - [`FilterEngine`]: evaluates a [`FilterSpec`] against entries
//! - [`spec`]: filter data structures and flag parsing

pub mod spec;

pub use spec::{ANY_FIELD, FilterSpec, FilterSpecBuilder, LevelFilter, WhereClause};

use prettylog_core::types::{LogEntry, SeverityTable};

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Show,
    /// Level outside the requested range, or unknown
    LevelMismatch,
    /// No where-clause matched
    NoWhereMatch,
    /// Message is on the ignore list
    Ignored,
}

/// Applies a [`FilterSpec`] using a severity table.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    spec: FilterSpec,
    severities: SeverityTable,
}

impl FilterEngine {
    pub fn new(spec: FilterSpec, severities: SeverityTable) -> Self {
        Self { spec, severities }
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn should_show(&self, entry: &LogEntry) -> bool {
        self.check(entry) == Verdict::Show
    }

    /// Evaluates the line predicates, stopping at the first failure.
    pub fn check(&self, entry: &LogEntry) -> Verdict {
        if !entry.is_parsed {
            return Verdict::Show;
        }
        if !self.level_matches(entry) {
            return Verdict::LevelMismatch;
        }
        if !self.where_matches(entry) {
            return Verdict::NoWhereMatch;
        }
        if self.spec.ignored_messages.matches(&entry.message) {
            return Verdict::Ignored;
        }
        Verdict::Show
    }

    fn level_matches(&self, entry: &LogEntry) -> bool {
        match self.spec.level {
            None => true,
            Some(filter) => filter.accepts(self.severities.severity_of(&entry.level)),
        }
    }

    // Clauses are alternatives: one match shows the line.
    fn where_matches(&self, entry: &LogEntry) -> bool {
        if self.spec.where_clauses.is_empty() {
            return true;
        }
        self.spec.where_clauses.iter().any(|clause| {
            if clause.is_any_field() {
                entry.message.contains(clause.value.as_str())
                    || entry
                        .fields
                        .values()
                        .any(|value| value.contains(clause.value.as_str()))
            } else {
                entry.field(&clause.field) == Some(clause.value.as_str())
            }
        })
    }

    /// Whether a data field survives inclusion/exclusion. Inclusion wins when both are set.
    pub fn shows_field(&self, name: &str) -> bool {
        if !self.spec.included.is_empty() {
            return self.spec.included.matches(name);
        }
        if !self.spec.excluded.is_empty() {
            return !self.spec.excluded.matches(name);
        }
        true
    }

    /// The entry's data fields that survive [`FilterEngine::shows_field`], sorted by name.
    pub fn visible_fields<'a>(
        &'a self,
        entry: &'a LogEntry,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        entry
            .fields
            .iter()
            .filter(|(name, _)| self.shows_field(name))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
