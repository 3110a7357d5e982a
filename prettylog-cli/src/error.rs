//! CLI-specific error types and exit code mapping

use prettylog_core::error::PrettylogError;
use prettylog_pipeline::LogPipelineError;

/// CLI-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration, flag or filter problem found before reading any input.
    #[error("configuration error: {0}")]
    Config(String),

    /// Stdin is not usable as input.
    #[error("{0}")]
    Input(String),

    /// IO error (stdin read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from prettylog-core.
    #[error("{0}")]
    Core(PrettylogError),

    /// Pipeline failure while processing input.
    #[error("pipeline error: {0}")]
    Pipeline(LogPipelineError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                           |
    /// |------|-----------------------------------|
    /// | 0    | Success                           |
    /// | 1    | Input, IO or pipeline error       |
    /// | 2    | Configuration or flag error       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Core(PrettylogError::Config(_) | PrettylogError::Filter(_)) => 2,
            Self::Input(_) | Self::Io(_) | Self::Core(_) | Self::Pipeline(_) => 1,
        }
    }
}

impl From<PrettylogError> for CliError {
    fn from(e: PrettylogError) -> Self {
        match e {
            PrettylogError::Io(io) => Self::Io(io),
            other => Self::Core(other),
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        match e {
            LogPipelineError::FilterSpec { .. } | LogPipelineError::UnknownLevel { .. } => {
                Self::Config(e.to_string())
            }
            LogPipelineError::Io(io) => Self::Io(io),
            other => Self::Pipeline(other),
        }
    }
}
