//! Error types shared by every prettylog crate.

/// Top-level prettylog error.
#[derive(Debug, thiserror::Error)]
pub enum PrettylogError {
    /// Configuration loading or validation failure
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Filter specification rejected at construction time
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// I/O failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// Config file is not valid TOML or has the wrong shape
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// A value parsed but is not acceptable
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Filter specification errors
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A level flag names a level missing from the severity table
    #[error("unknown level '{level}' for --{flag}")]
    UnknownLevel { flag: String, level: String },

    /// A flag value does not follow the expected syntax
    #[error("invalid --{flag}: {reason}")]
    InvalidClause { flag: String, reason: String },
}
