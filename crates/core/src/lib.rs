//! prettylog-core -- types, styles, errors and configuration shared by the
//! prettylog crates.
//!
//! - [`types`]: [`LogEntry`] and the [`SeverityTable`]
//! - [`style`]: per-category style tables
//! - [`config`]: `prettylog.toml` loading with env overrides
//! - [`error`]: error taxonomy

pub mod config;
pub mod error;
pub mod style;
pub mod types;

pub use config::{GeneralConfig, IgnoreConfig, KeywordConfig, PrettylogConfig};
pub use error::{ConfigError, FilterError, PrettylogError};
pub use style::{
    DEFAULT_STYLE_KEY, HIGHLIGHT_STYLE_KEY, KeyValueStyle, Style, StyleRule, StyleTable,
    StyleTables,
};
pub use types::{LogEntry, Severity, SeverityTable};
