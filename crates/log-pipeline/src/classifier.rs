//! Keyword classifier -- maps the keys of a JSON log line onto canonical slots.
//!
//! Logging libraries disagree on key names (`msg` vs `message`, `level` vs
//! `log.level`, ...). The classifier uses the keyword sets of a
//! [`KeywordConfig`] to decide which key feeds which slot of a [`LogEntry`].
//!
//! ```ignore
//! use bytes::Bytes;
//! use prettylog_pipeline::classifier::KeywordClassifier;
//!
//! let classifier = KeywordClassifier::default();
//! let entry = classifier.classify(1, Bytes::from_static(br#"{"level":"info","msg":"started"}"#));
//! assert_eq!(entry.message, "started");
//! ```

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::trace;

use prettylog_core::config::KeywordConfig;
use prettylog_core::types::LogEntry;

/// Lines longer than this are passed through without decoding.
const DEFAULT_MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Semantic slot a key was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Level,
    Message,
    Timestamp,
    /// Error object, flattened one level into `key.child` fields
    Error,
    /// Labelled data object, flattened like errors
    Data,
}

/// Builds [`LogEntry`] values from raw input lines.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: KeywordConfig,
    max_input_size: usize,
}

impl KeywordClassifier {
    pub fn new(mut keywords: KeywordConfig) -> Self {
        keywords.normalize();
        Self {
            keywords,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }

    /// Sets the size above which lines are not decoded.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    pub fn max_input_size(&self) -> usize {
        self.max_input_size
    }

    /// Classifies one raw line. Never fails: anything that is not a JSON object
    /// becomes an unparsed entry carrying the raw bytes.
    pub fn classify(&self, line_number: u64, raw: Bytes) -> LogEntry {
        match self.decode(&raw) {
            Some(object) => {
                let mut entry = LogEntry::parsed(line_number, raw);
                self.fill(&mut entry, object);
                entry
            }
            None => LogEntry::unparsed(line_number, raw),
        }
    }

    /// Slot for `key`, checked in the order level, message, timestamp, error, data.
    pub fn slot_of(&self, key: &str) -> Option<Slot> {
        let key = key.to_lowercase();
        let sets = [
            (Slot::Level, &self.keywords.level),
            (Slot::Message, &self.keywords.message),
            (Slot::Timestamp, &self.keywords.timestamp),
            (Slot::Error, &self.keywords.error),
            (Slot::Data, &self.keywords.data),
        ];
        sets.into_iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| *keyword == key))
            .map(|(slot, _)| slot)
    }

    fn decode(&self, raw: &[u8]) -> Option<Map<String, Value>> {
        if raw.len() > self.max_input_size {
            trace!(
                size = raw.len(),
                max = self.max_input_size,
                "line too large, passing through"
            );
            return None;
        }
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(object)) => Some(object),
            Ok(_) => None,
            Err(e) => {
                trace!(error = %e, "line is not JSON");
                None
            }
        }
    }

    fn fill(&self, entry: &mut LogEntry, object: Map<String, Value>) {
        let mut claimed = [false; 3];

        for (key, value) in object {
            let slot = self.slot_of(&key);
            let target = match slot {
                Some(Slot::Level) => Some((0, &mut entry.level)),
                Some(Slot::Message) => Some((1, &mut entry.message)),
                Some(Slot::Timestamp) => Some((2, &mut entry.time)),
                _ => None,
            };

            if let Some((idx, target)) = target {
                if !claimed[idx] {
                    claimed[idx] = true;
                    *target = slot_text(&value);
                    continue;
                }
                // a second key for an already-claimed slot stays visible as data
                entry.fields.insert(key, stringify(&value));
                continue;
            }

            match (slot, value) {
                (Some(Slot::Error | Slot::Data), Value::Object(children)) => {
                    for (child, child_value) in children {
                        entry
                            .fields
                            .insert(format!("{key}.{child}"), stringify(&child_value));
                    }
                }
                (_, value) => {
                    entry.fields.insert(key, stringify(&value));
                }
            }
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(KeywordConfig::default())
    }
}

/// Text for a canonical slot; `null` leaves the slot empty.
fn slot_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => stringify(other),
    }
}

/// Default textual form of a JSON value: strings unquoted, everything else as
/// compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
