//! Domain types shared by the classifier, filter and renderer.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One input line after classification.
///
/// Built once by the classifier and never mutated afterwards. Unparsed entries
/// only carry `line_number` and `original_line`; the canonical slots stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    /// 1-based position in the input stream
    pub line_number: u64,
    /// Raw bytes as read, including any trailing newline
    pub original_line: Bytes,
    /// True iff the line decoded as a JSON object
    pub is_parsed: bool,
    /// Timestamp slot, empty if absent
    pub time: String,
    /// Level slot, empty if absent
    pub level: String,
    /// Message slot, empty if absent
    pub message: String,
    /// Every key not claimed by a canonical slot, sorted by name
    pub fields: BTreeMap<String, String>,
}

impl LogEntry {
    /// Entry for a line that decoded successfully. Slots are filled by the caller.
    pub fn parsed(line_number: u64, original_line: Bytes) -> Self {
        Self {
            line_number,
            original_line,
            is_parsed: true,
            ..Self::default()
        }
    }

    /// Entry for a line that is not structured data.
    pub fn unparsed(line_number: u64, original_line: Bytes) -> Self {
        Self {
            line_number,
            original_line,
            is_parsed: false,
            ..Self::default()
        }
    }

    /// Looks up a data field by exact name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The raw line without its line terminator, decoded lossily. For display only;
    /// output uses `original_line`.
    pub fn raw_text(&self) -> Cow<'_, str> {
        let mut raw: &[u8] = &self.original_line;
        if let Some(stripped) = raw.strip_suffix(b"\n") {
            raw = stripped;
        }
        if let Some(stripped) = raw.strip_suffix(b"\r") {
            raw = stripped;
        }
        String::from_utf8_lossy(raw)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_parsed {
            write!(
                f,
                "#{} [{}] {} {} ({} fields)",
                self.line_number,
                self.level,
                self.time,
                self.message,
                self.fields.len()
            )
        } else {
            write!(f, "#{} (unparsed) {}", self.line_number, self.raw_text())
        }
    }
}

/// Position of a level on the severity scale. Larger is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    /// Returns `None` for zero, which is reserved for "no severity".
    pub fn new(value: u8) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Level name to severity mapping.
///
/// Names are stored lower-cased and looked up case-insensitively.
/// Unknown names have no severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityTable {
    levels: BTreeMap<String, u8>,
}

impl SeverityTable {
    /// Builds a table from `(name, severity)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        Self {
            levels: pairs
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect(),
        }
    }

    /// Resolves a level name.
    pub fn severity_of(&self, level: &str) -> Option<Severity> {
        let value = match self.levels.get(level) {
            Some(value) => *value,
            None => *self.levels.get(&level.to_lowercase())?,
        };
        Severity::new(value)
    }

    /// Lower-cases every key in place. Needed after deserialization.
    pub fn normalize(&mut self) {
        let levels = std::mem::take(&mut self.levels);
        self.levels = levels
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();
    }

    /// Level names in ascending severity order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<(&str, u8)> = self
            .levels
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        names.sort_by_key(|(name, value)| (*value, *name));
        names.into_iter().map(|(name, _)| name).collect()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, u8)> {
        self.levels.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self::from_pairs([
            ("trace", 1),
            ("debug", 2),
            ("info", 3),
            ("warning", 4),
            ("error", 5),
            ("fatal", 6),
            ("panic", 7),
        ])
    }
}
