//! Wildcard field matching.
//!
//! A pattern is an exact name or carries a `*` at its start, end or both:
//!
//! | pattern    | matches names that            |
//! |------------|-------------------------------|
//! | `trace.*`  | start with `trace.`           |
//! | `*.id`     | end with `.id`                |
//! | `*err*`    | contain `err`                 |
//!
//! Comparisons ignore ASCII case. A `*` anywhere else is a literal character.

/// Tests `name` against a single pattern, exact or wildcard.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    pattern.eq_ignore_ascii_case(name) || wildcard_matches(pattern, name)
}

/// Tests `name` against the wildcard structure of `pattern` only.
/// Patterns without a leading or trailing `*` never match here.
pub fn wildcard_matches(pattern: &str, name: &str) -> bool {
    match Wildcard::parse(pattern) {
        Some(wildcard) => wildcard.matches(name),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wildcard<'a> {
    Prefix(&'a str),
    Suffix(&'a str),
    Contains(&'a str),
}

impl<'a> Wildcard<'a> {
    fn parse(pattern: &'a str) -> Option<Self> {
        let leading = pattern.starts_with('*');
        let trailing = pattern.ends_with('*');
        match (leading, trailing) {
            (true, true) if pattern.len() >= 2 => Some(Self::Contains(&pattern[1..pattern.len() - 1])),
            // a lone "*" is both leading and trailing
            (true, true) => Some(Self::Prefix("")),
            (false, true) => Some(Self::Prefix(&pattern[..pattern.len() - 1])),
            (true, false) => Some(Self::Suffix(&pattern[1..])),
            (false, false) => None,
        }
    }

    fn matches(self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => starts_with_ignore_case(name, prefix),
            Self::Suffix(suffix) => ends_with_ignore_case(name, suffix),
            Self::Contains(inner) => contains_ignore_case(name, inner),
        }
    }
}

/// A set of field-name patterns, kept in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    /// Builds a set, skipping empty and duplicate patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for pattern in patterns {
            let pattern = pattern.into();
            if !pattern.is_empty() && !set.patterns.contains(&pattern) {
                set.patterns.push(pattern);
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, name: &str) -> bool {
        self.first_match(name).is_some()
    }

    /// The pattern that lets `name` in, if any.
    ///
    /// Exact names are tried first, then trailing-`*` prefixes, then leading-`*`
    /// suffixes, then `*..*` containment; the first success wins.
    pub fn first_match(&self, name: &str) -> Option<&str> {
        if let Some(exact) = self.patterns.iter().find(|p| p.eq_ignore_ascii_case(name)) {
            return Some(exact);
        }

        let kinds: [fn(&str) -> bool; 3] = [
            |p| p.ends_with('*'),
            |p| p.starts_with('*'),
            |p| p.len() >= 2 && p.starts_with('*') && p.ends_with('*'),
        ];
        for applies in kinds {
            let hit = self
                .patterns
                .iter()
                .filter(|p| applies(p))
                .find(|p| wildcard_matches(p, name));
            if let Some(pattern) = hit {
                return Some(pattern);
            }
        }
        None
    }
}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.as_bytes()[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

fn contains_ignore_case(name: &str, inner: &str) -> bool {
    if inner.is_empty() {
        return true;
    }
    name.as_bytes()
        .windows(inner.len())
        .any(|window| window.eq_ignore_ascii_case(inner.as_bytes()))
}
