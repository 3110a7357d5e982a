//! CLI argument parsing using clap derive API
//!
//! Purely declarative: turning these values into a filter spec and render
//! options happens in [`crate::run`].

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

/// prettylog -- pretty-print structured JSON logs read from stdin.
///
/// Example: `kubectl logs my-pod | prettylog --min-level warning --fields 'trace.*'`
#[derive(Parser, Debug)]
#[command(name = "prettylog", version, about, long_about = None)]
pub struct Cli {
    /// Path to a prettylog.toml file (default: $PRETTYLOG_HOME/prettylog.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Diagnostic log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Diagnostic log format.
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Print debug diagnostics to stderr.
    #[arg(long)]
    pub debug: bool,

    /// Print the effective message ignore list and exit.
    #[arg(long)]
    pub show_ignored: bool,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Diagnostic output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

/// Output layout switches.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print level, timestamp and message first, then each data field on its own line.
    #[arg(short, long)]
    pub multi_line: bool,

    /// Don't show data fields.
    #[arg(long)]
    pub no_data: bool,

    /// Disable colours and emphasis.
    #[arg(long)]
    pub no_color: bool,
}

/// Line and field filters.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only show lines with this level (trace|debug|info|warning|error|fatal|panic).
    #[arg(long)]
    pub level: Option<String>,

    /// Only show lines at or above this level.
    #[arg(long)]
    pub min_level: Option<String>,

    /// Only show lines at or below this level.
    #[arg(long)]
    pub max_level: Option<String>,

    /// Only show this data field.
    #[arg(long)]
    pub field: Option<String>,

    /// Only show these data fields, separated by commas. Supports `prefix*`, `*suffix`, `*part*`.
    #[arg(long)]
    pub fields: Option<String>,

    /// Hide these data fields, separated by commas.
    #[arg(long)]
    pub except: Option<String>,

    /// Truncate a field: `message=50` keeps 50 characters, `stack=\n` cuts at the first newline.
    #[arg(long, value_name = "FIELD=N|FIELD=DELIM")]
    pub trunc: Option<String>,

    /// Only show lines where FIELD=VALUE, or where VALUE appears anywhere. Comma separated
    /// clauses are alternatives.
    #[arg(long = "where", value_name = "CLAUSES")]
    pub where_clauses: Option<String>,

    /// Emphasise field names matching this pattern.
    #[arg(long)]
    pub highlight_key: Option<String>,

    /// Emphasise values and messages matching this pattern.
    #[arg(long)]
    pub highlight_value: Option<String>,

    /// Hide lines whose message matches this pattern. Repeatable.
    #[arg(long = "ignore-msg", value_name = "PATTERN")]
    pub ignore_msg: Vec<String>,
}
