//! Pipeline error types.
//!
//! [`LogPipelineError`] covers everything that can go wrong while building a
//! [`FilterSpec`](crate::filter::FilterSpec) or running the pipeline. It converts
//! into [`PrettylogError`] so callers can propagate it with `?`.

use prettylog_core::error::{FilterError, PrettylogError};

/// Pipeline domain error.
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// A filter flag value does not follow its syntax
    #[error("invalid --{flag}: {reason}")]
    FilterSpec {
        /// Flag name without dashes
        flag: String,
        reason: String,
    },

    /// A level flag names a level missing from the severity table
    #[error("unknown level '{level}' for --{flag}, expected one of: {known}")]
    UnknownLevel {
        flag: String,
        level: String,
        /// Comma separated known level names
        known: String,
    },

    /// A pipeline stage went away unexpectedly
    #[error("channel error: {0}")]
    Channel(String),

    /// Reading input or writing output failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for PrettylogError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::FilterSpec { flag, reason } => {
                PrettylogError::Filter(FilterError::InvalidClause { flag, reason })
            }
            LogPipelineError::UnknownLevel { flag, level, .. } => {
                PrettylogError::Filter(FilterError::UnknownLevel { flag, level })
            }
            LogPipelineError::Io(e) => PrettylogError::Io(e),
            LogPipelineError::Channel(reason) => {
                PrettylogError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, reason))
            }
        }
    }
}
