//! Logging initialization for prettylog's own diagnostics.
//!
//! Diagnostics always go to stderr so they never mix with rendered log lines
//! on stdout. Supports JSON structured logging and human-readable pretty format.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::CliError;

/// Filter for prettylog's diagnostics. `RUST_LOG` takes precedence over `level`
/// unless `forced` is set (`--debug`).
pub fn env_filter(level: &str, forced: bool) -> EnvFilter {
    if forced {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable output
pub fn init_tracing(env_filter: EnvFilter, format: &str) -> Result<(), CliError> {
    match format {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| {
                CliError::Config(format!("failed to initialize JSON tracing subscriber: {e}"))
            }),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| {
                CliError::Config(format!("failed to initialize pretty tracing subscriber: {e}"))
            }),
        other => Err(CliError::Config(format!(
            "unknown log format '{other}', expected 'json' or 'pretty'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing_subscriber::filter::LevelFilter;

    fn with_rust_log<T>(value: &str, f: impl FnOnce() -> T) -> T {
        let original = std::env::var("RUST_LOG").ok();
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            std::env::set_var("RUST_LOG", value);
        }
        let result = f();
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            match original {
                Some(val) => std::env::set_var("RUST_LOG", val),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
        result
    }

    #[test]
    #[serial]
    fn forced_level_ignores_rust_log() {
        let filter = with_rust_log("warn", || env_filter("debug", true));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    #[serial]
    fn rust_log_wins_over_configured_level() {
        let filter = with_rust_log("warn", || env_filter("debug", false));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = init_tracing(EnvFilter::new("info"), "xml").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'xml'"));
    }
}
