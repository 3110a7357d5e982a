//! Value truncation for a single named field (`--trunc FIELD=N` / `--trunc FIELD=DELIM`).

use std::fmt;
use std::str::FromStr;

use crate::error::LogPipelineError;

const FLAG: &str = "trunc";

/// How much of a value to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TruncateLimit {
    /// Keep at most this many characters
    Chars(usize),
    /// Keep everything before the first occurrence of the delimiter
    Delimiter(String),
}

/// Bounds the value of one field. `message` targets the message slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncate {
    field: String,
    limit: TruncateLimit,
}

impl Truncate {
    pub fn chars(field: impl Into<String>, count: usize) -> Self {
        Self {
            field: field.into(),
            limit: TruncateLimit::Chars(count),
        }
    }

    /// Delimiter rule. A literally typed `\n` or `\t` becomes a real newline or tab.
    pub fn delimiter(field: impl Into<String>, delimiter: &str) -> Self {
        Self {
            field: field.into(),
            limit: TruncateLimit::Delimiter(unescape(delimiter)),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn limit(&self) -> &TruncateLimit {
        &self.limit
    }

    /// Truncates `value` if `field` is the targeted field, otherwise borrows it unchanged.
    pub fn apply<'a>(&self, field: &str, value: &'a str) -> &'a str {
        if field != self.field {
            return value;
        }
        match &self.limit {
            TruncateLimit::Chars(count) => match value.char_indices().nth(*count) {
                Some((end, _)) => &value[..end],
                None => value,
            },
            TruncateLimit::Delimiter(delimiter) if delimiter.is_empty() => value,
            TruncateLimit::Delimiter(delimiter) => match value.find(delimiter.as_str()) {
                Some(end) => &value[..end],
                None => value,
            },
        }
    }
}

impl FromStr for Truncate {
    type Err = LogPipelineError;

    /// Parses `FIELD=N` or `FIELD=DELIM`. A value that parses as an integer is
    /// a character count; anything else is a delimiter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('=').collect();
        let [field, limit] = parts.as_slice() else {
            return Err(invalid(format!(
                "'{s}', expected FIELD=N or FIELD=DELIM (e.g. message=50)"
            )));
        };
        if field.is_empty() {
            return Err(invalid(format!("'{s}' has an empty field name")));
        }

        match limit.parse::<i64>() {
            Ok(count) if count < 0 => Err(invalid(format!(
                "character count must not be negative, got {count}"
            ))),
            Ok(count) => {
                let count = usize::try_from(count)
                    .map_err(|_| invalid(format!("character count {count} is too large")))?;
                Ok(Self::chars(*field, count))
            }
            Err(_) if limit.is_empty() => {
                Err(invalid(format!("'{s}' has an empty limit")))
            }
            Err(_) => Ok(Self::delimiter(*field, limit)),
        }
    }
}

impl fmt::Display for Truncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.limit {
            TruncateLimit::Chars(count) => write!(f, "{}={count}", self.field),
            TruncateLimit::Delimiter(delimiter) => {
                write!(f, "{}={}", self.field, delimiter.escape_debug())
            }
        }
    }
}

fn unescape(delimiter: &str) -> String {
    delimiter.replace("\\n", "\n").replace("\\t", "\t")
}

fn invalid(reason: String) -> LogPipelineError {
    LogPipelineError::FilterSpec {
        flag: FLAG.to_owned(),
        reason,
    }
}
