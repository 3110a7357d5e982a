//! Line renderer -- turns a [`LogEntry`] into output text.
//!
//! Single-line layout:
//! ```text
//! [level] timestamp - message - key=[value], key=[value]
//! ```
//! Multi-line layout:
//! ```text
//! [level] timestamp - message
//!   key: value
//!   key: value
//! ```
//! Fields are sorted by name. The timestamp segment is left out when empty.
//! Unparsed lines are emitted byte for byte as read, without styling.

use std::fmt::Write as _;

use bytes::Bytes;
use prettylog_core::style::Style;
use prettylog_core::types::LogEntry;

use crate::filter::{FilterEngine, Verdict};
use crate::style::StyleResolver;

/// Field name that targets the message slot in `--trunc`.
pub const MESSAGE_FIELD: &str = "message";

/// Output switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// One line per field instead of a single line
    pub multi_line: bool,
    /// Render data fields at all
    pub show_data: bool,
    /// Apply styles; plain text when false
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            multi_line: false,
            show_data: true,
            color: true,
        }
    }
}

/// Filters, truncates, styles and lays out entries.
#[derive(Debug, Clone)]
pub struct LineRenderer {
    filter: FilterEngine,
    styles: StyleResolver,
    options: RenderOptions,
}

impl LineRenderer {
    pub fn new(filter: FilterEngine, styles: StyleResolver, options: RenderOptions) -> Self {
        Self {
            filter,
            styles,
            options,
        }
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    /// Rendered text without a trailing newline, or `None` if the entry is filtered out.
    pub fn render(&self, entry: &LogEntry) -> Option<String> {
        match self.filter.check(entry) {
            Verdict::Show => Some(self.format(entry)),
            _ => None,
        }
    }

    /// Bytes to write for a shown entry, newline included. Unparsed lines keep
    /// their exact bytes and terminator; only a missing final `\n` is added.
    pub fn output(&self, entry: &LogEntry) -> Bytes {
        if !entry.is_parsed {
            if entry.original_line.ends_with(b"\n") {
                return entry.original_line.clone();
            }
            let mut line = Vec::with_capacity(entry.original_line.len() + 1);
            line.extend_from_slice(&entry.original_line);
            line.push(b'\n');
            return Bytes::from(line);
        }

        let mut text = self.format(entry);
        text.push('\n');
        Bytes::from(text)
    }

    /// Renders without consulting the filter. Unparsed lines come back as lossily
    /// decoded text; use [`LineRenderer::output`] for the exact bytes.
    pub fn format(&self, entry: &LogEntry) -> String {
        if !entry.is_parsed {
            return entry.raw_text().into_owned();
        }

        let mut out = String::with_capacity(entry.original_line.len() + 32);
        self.write_head(&mut out, entry);

        let fields = self.fields(entry);
        if fields.is_empty() {
            return out;
        }

        if self.options.multi_line {
            for (name, value) in &fields {
                let _ = write!(out, "\n  {name}: {value}");
            }
        } else {
            out.push_str(" - ");
            for (idx, (name, value)) in fields.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{name}=[{value}]");
            }
        }
        out
    }

    fn write_head(&self, out: &mut String, entry: &LogEntry) {
        let spec = self.filter.spec();
        let message = match &spec.truncate {
            Some(rule) => rule.apply(MESSAGE_FIELD, &entry.message),
            None => entry.message.as_str(),
        };

        out.push('[');
        out.push_str(&self.paint(&self.styles.level(&entry.level), &entry.level));
        out.push(']');
        if !entry.time.is_empty() {
            out.push(' ');
            out.push_str(&self.paint(&self.styles.timestamp(&entry.time), &entry.time));
        }
        out.push_str(" - ");
        out.push_str(&self.paint(&self.styles.message(message), message));
    }

    /// Styled `(name, value)` pairs of the visible data fields, sorted by name.
    fn fields(&self, entry: &LogEntry) -> Vec<(String, String)> {
        if !self.options.show_data {
            return Vec::new();
        }
        let truncate = self.filter.spec().truncate.as_ref();
        self.filter
            .visible_fields(entry)
            .map(|(name, value)| {
                let value = truncate.map_or(value, |rule| rule.apply(name, value));
                (
                    self.paint(&self.styles.field_key(name), name),
                    self.paint(&self.styles.field_value(name, value), value),
                )
            })
            .collect()
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.options.color {
            style.paint(text).to_string()
        } else {
            text.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::KeywordClassifier;
    use crate::filter::{FilterSpec, FilterSpecBuilder};
    use prettylog_core::types::SeverityTable;

    const PLAIN: RenderOptions = RenderOptions {
        multi_line: false,
        show_data: true,
        color: false,
    };

    fn renderer(builder: FilterSpecBuilder, options: RenderOptions) -> LineRenderer {
        let severities = SeverityTable::default();
        let spec = builder.build(&severities).unwrap();
        LineRenderer::new(
            FilterEngine::new(spec, severities),
            StyleResolver::default(),
            options,
        )
    }

    fn entry(raw: &'static str) -> LogEntry {
        KeywordClassifier::default().classify(1, Bytes::from_static(raw.as_bytes()))
    }

    #[test]
    fn single_line_without_timestamp() {
        let out = renderer(FilterSpec::builder(), PLAIN)
            .render(&entry(r#"{"level":"info","msg":"started","port":8080}"#))
            .unwrap();
        assert_eq!(out, "[info] - started - port=[8080]");
    }

    #[test]
    fn single_line_with_timestamp_and_sorted_fields() {
        let out = renderer(FilterSpec::builder(), PLAIN)
            .render(&entry(
                r#"{"time":"12:00:00","level":"warning","msg":"slow","b":"2","a":"1"}"#,
            ))
            .unwrap();
        assert_eq!(out, "[warning] 12:00:00 - slow - a=[1], b=[2]");
    }

    #[test]
    fn no_fields_means_no_trailing_separator() {
        let out = renderer(FilterSpec::builder(), PLAIN)
            .render(&entry(r#"{"level":"debug","msg":"tick"}"#))
            .unwrap();
        assert_eq!(out, "[debug] - tick");
    }

    #[test]
    fn multi_line_layout() {
        let options = RenderOptions {
            multi_line: true,
            ..PLAIN
        };
        let out = renderer(FilterSpec::builder(), options)
            .render(&entry(
                r#"{"level":"info","msg":"req","status":200,"path":"/"}"#,
            ))
            .unwrap();
        assert_eq!(out, "[info] - req\n  path: /\n  status: 200");
    }

    #[test]
    fn included_fields_only() {
        let out = renderer(FilterSpec::builder().fields("trace.id"), PLAIN)
            .render(&entry(
                r#"{"level":"error","message":"boom","error":{"id":"abc"},"trace.id":"abc","x":1}"#,
            ))
            .unwrap();
        assert_eq!(out, "[error] - boom - trace.id=[abc]");
    }

    #[test]
    fn no_data_hides_fields() {
        let options = RenderOptions {
            show_data: false,
            ..PLAIN
        };
        let out = renderer(FilterSpec::builder(), options)
            .render(&entry(r#"{"level":"info","msg":"m","port":1}"#))
            .unwrap();
        assert_eq!(out, "[info] - m");
    }

    #[test]
    fn truncates_message() {
        let out = renderer(FilterSpec::builder().truncate("message=10"), PLAIN)
            .render(&entry(r#"{"level":"info","msg":"a very long message body"}"#))
            .unwrap();
        assert_eq!(out, "[info] - a very lon");
    }

    #[test]
    fn truncates_named_field_only() {
        let out = renderer(FilterSpec::builder().truncate("stack=\\n"), PLAIN)
            .render(&entry(
                r#"{"msg":"x","stack":"first\nsecond","other":"a\nb"}"#,
            ))
            .unwrap();
        assert_eq!(out, "[] - x - other=[a\nb], stack=[first]");
    }

    #[test]
    fn output_keeps_unparsed_bytes_exactly() {
        let renderer = renderer(FilterSpec::builder(), PLAIN);
        let raw = Bytes::from_static(b"caf\xe9 latin1 line\r\n");
        let entry = KeywordClassifier::default().classify(1, raw.clone());
        assert!(!entry.is_parsed);
        assert_eq!(renderer.output(&entry), raw);
    }

    #[test]
    fn output_terminates_last_unparsed_line() {
        let renderer = renderer(FilterSpec::builder(), PLAIN);
        let entry = entry("tail without newline");
        assert_eq!(renderer.output(&entry).as_ref(), b"tail without newline\n");
    }

    #[test]
    fn output_of_parsed_line_ends_with_newline() {
        let renderer = renderer(FilterSpec::builder(), PLAIN);
        let entry = entry(r#"{"level":"info","msg":"started"}"#);
        assert_eq!(renderer.output(&entry).as_ref(), b"[info] - started\n");
    }

    #[test]
    fn unparsed_line_is_verbatim() {
        let out = renderer(FilterSpec::builder().level("error"), PLAIN)
            .render(&entry("plain text log\n"))
            .unwrap();
        assert_eq!(out, "plain text log");
    }

    #[test]
    fn filtered_entry_renders_nothing() {
        let renderer = renderer(FilterSpec::builder().min_level("error"), PLAIN);
        assert!(renderer.render(&entry(r#"{"level":"info","msg":"x"}"#)).is_none());
    }

    #[test]
    fn format_ignores_the_filter() {
        let renderer = renderer(FilterSpec::builder().min_level("error"), PLAIN);
        assert_eq!(renderer.format(&entry(r#"{"level":"info","msg":"x"}"#)), "[info] - x");
    }

    #[test]
    fn coloured_output_keeps_text() {
        let options = RenderOptions {
            color: true,
            ..PLAIN
        };
        let out = renderer(FilterSpec::builder(), options)
            .render(&entry(r#"{"level":"error","msg":"boom"}"#))
            .unwrap();
        assert!(out.contains("error"));
        assert!(out.contains("boom"));
    }
}
