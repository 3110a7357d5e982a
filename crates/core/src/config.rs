//! Configuration -- `prettylog.toml` parsing and runtime settings.
//!
//! [`PrettylogConfig`] holds everything that is read once at startup and stays
//! fixed for the run: keyword sets, the severity table, style overrides and the
//! message ignore list.
//!
//! # Loading precedence
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables (`PRETTYLOG_GENERAL_LOG_LEVEL=debug`)
//! 3. Config file (`--config`, or `$PRETTYLOG_HOME/prettylog.toml`)
//! 4. Built-in defaults
//!
//! ```no_run
//! # async fn example() -> Result<(), prettylog_core::error::PrettylogError> {
//! use prettylog_core::config::PrettylogConfig;
//!
//! let config = PrettylogConfig::load("prettylog.toml").await?;
//! let config = PrettylogConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, PrettylogError};
use crate::style::StyleTables;
use crate::types::SeverityTable;

/// Env var naming the directory that holds `prettylog.toml`.
pub const HOME_ENV_VAR: &str = "PRETTYLOG_HOME";

/// Config file name looked up inside [`HOME_ENV_VAR`].
pub const CONFIG_FILE_NAME: &str = "prettylog.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrettylogConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub severity: SeverityTable,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    /// User style rules, layered over the built-in tables by
    /// [`PrettylogConfig::effective_styles`]
    #[serde(default)]
    pub styles: StyleTables,
}

impl PrettylogConfig {
    /// Loads a config file, applies env overrides and validates the result.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PrettylogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise `$PRETTYLOG_HOME/prettylog.toml` when it
    /// exists, otherwise the defaults. Env overrides apply in every case.
    pub async fn discover(path: Option<&Path>) -> Result<Self, PrettylogError> {
        if let Some(path) = path {
            return Self::load(path).await;
        }

        match home_config_path() {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => {
                debug!(path = %path.display(), "using config from {HOME_ENV_VAR}");
                Self::load(path).await
            }
            _ => {
                debug!("no config file found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Loads a config file without env overrides.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PrettylogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PrettylogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PrettylogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text. Keyword and severity names are lower-cased.
    pub fn parse(toml_str: &str) -> Result<Self, PrettylogError> {
        let mut config: Self = toml::from_str(toml_str).map_err(|e| {
            PrettylogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })?;
        config.keywords.normalize();
        config.severity.normalize();
        Ok(config)
    }

    /// Env var naming: `PRETTYLOG_{SECTION}_{FIELD}`.
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "PRETTYLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PRETTYLOG_GENERAL_LOG_FORMAT");
        override_csv(&mut self.ignore.messages, "PRETTYLOG_IGNORE_MESSAGES");
    }

    pub fn validate(&self) -> Result<(), PrettylogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        for (name, value) in self.severity.entries() {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("severity.{name}"),
                    reason: "severity must be greater than 0".to_owned(),
                }
                .into());
            }
        }

        self.keywords.validate()?;
        self.styles.validate()?;
        Ok(())
    }

    /// Built-in style tables with the user's rules layered on top.
    pub fn effective_styles(&self) -> StyleTables {
        StyleTables::builtin_with(&self.styles)
    }
}

/// Settings for prettylog's own diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Diagnostic log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Diagnostic log format (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// Key names recognised for each canonical slot.
///
/// Defaults cover logrus (`msg`, `level`, `time`, `error`) and the Elastic Common
/// Schema (`message`, `log.level`, `@timestamp`). Names are matched
/// case-insensitively; when a key appears in two sets the slot checked first
/// wins, in the order level, message, timestamp, error, data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub message: Vec<String>,
    pub level: Vec<String>,
    pub timestamp: Vec<String>,
    pub error: Vec<String>,
    /// Keys whose nested object is flattened into labelled data fields
    pub data: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            message: vec!["msg".to_owned(), "message".to_owned()],
            level: vec!["level".to_owned(), "log.level".to_owned()],
            timestamp: vec!["time".to_owned(), "@timestamp".to_owned()],
            error: vec!["error".to_owned()],
            data: vec!["labels".to_owned()],
        }
    }
}

impl KeywordConfig {
    /// Lower-cases every keyword.
    pub fn normalize(&mut self) {
        for set in [
            &mut self.message,
            &mut self.level,
            &mut self.timestamp,
            &mut self.error,
            &mut self.data,
        ] {
            for keyword in set.iter_mut() {
                *keyword = keyword.to_lowercase();
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (slot, set) in [
            ("message", &self.message),
            ("level", &self.level),
            ("timestamp", &self.timestamp),
            ("error", &self.error),
            ("data", &self.data),
        ] {
            if set.iter().any(|keyword| keyword.is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("keywords.{slot}"),
                    reason: "keywords must not be empty strings".to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Messages that are never shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Exact messages or wildcard patterns (`connection reset*`)
    pub messages: Vec<String>,
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV_VAR).map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

// --- env override helpers ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val.trim().is_empty() {
            warn!(env_key, "empty list in env var, ignoring");
            return;
        }
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
