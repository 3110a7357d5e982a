//! Integration tests for config files as the `prettylog` binary consumes them.
//!
//! Loads real TOML files from disk and drives the pipeline with the result.

use std::fs;

use prettylog_core::config::PrettylogConfig;
use prettylog_core::error::{ConfigError, PrettylogError};
use prettylog_pipeline::{FilterSpec, LogPipeline, RenderOptions};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const PLAIN: RenderOptions = RenderOptions {
    multi_line: false,
    show_data: true,
    color: false,
};

async fn write_and_load(content: &str) -> Result<PrettylogConfig, PrettylogError> {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("prettylog.toml");
    fs::write(&config_path, content).expect("should write config");
    PrettylogConfig::load(&config_path).await
}

#[tokio::test]
async fn test_full_config_loads() {
    let config = write_and_load(
        r#"
[general]
log_level = "debug"
log_format = "json"

[keywords]
level = ["lvl"]
message = ["text"]
timestamp = ["when"]

[severity]
minor = 1
major = 5

[ignore]
messages = ["healthz*"]

[[styles.level]]
pattern = "major"
fg = "red"
bold = true

[[styles.field]]
pattern = "user*"
key = { fg = "blue" }
"#,
    )
    .await
    .expect("valid config should load");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.ignore.messages, vec!["healthz*"]);
    assert_eq!(config.severity.names(), vec!["minor", "major"]);
}

#[tokio::test]
async fn test_empty_config_uses_defaults() {
    let config = write_and_load("").await.expect("empty config is valid");
    assert_eq!(config.general.log_level, "warn");
    assert_eq!(config.general.log_format, "pretty");
    assert!(config.ignore.messages.is_empty());
}

#[tokio::test]
async fn test_invalid_toml_is_parse_error() {
    let err = write_and_load("[general\nlog_level = ").await.unwrap_err();
    assert!(matches!(
        err,
        PrettylogError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn test_unknown_colour_is_rejected() {
    let err = write_and_load(
        r#"
[[styles.message]]
pattern = "*"
fg = "mauve"
"#,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("mauve"));
}

#[tokio::test]
async fn test_zero_severity_is_rejected() {
    let err = write_and_load("[severity]\nquiet = 0\n").await.unwrap_err();
    assert!(err.to_string().contains("severity.quiet"));
}

#[tokio::test]
async fn test_missing_explicit_path_is_not_found() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("absent.toml");
    let err = PrettylogConfig::discover(Some(&missing)).await.unwrap_err();
    assert!(matches!(
        err,
        PrettylogError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn test_config_drives_pipeline() {
    let config = write_and_load(
        r#"
[keywords]
level = ["lvl"]
message = ["text"]

[ignore]
messages = ["healthz*"]
"#,
    )
    .await
    .expect("config should load");

    let spec = FilterSpec::builder()
        .ignore_messages(config.ignore.messages.iter().cloned())
        .min_level("info")
        .build(&config.severity)
        .expect("spec should build");
    let pipeline = LogPipeline::builder()
        .config(&config)
        .filter_spec(spec)
        .options(PLAIN)
        .build();

    let input = concat!(
        "{\"lvl\":\"debug\",\"text\":\"noise\"}\n",
        "{\"lvl\":\"info\",\"text\":\"healthz ok\"}\n",
        "{\"lvl\":\"error\",\"text\":\"disk full\",\"mount\":\"/var\"}\n",
        "not json at all\n",
    );
    let mut out = Vec::new();
    let stats = pipeline
        .run(input.as_bytes(), &mut out, CancellationToken::new())
        .await
        .expect("pipeline should run");

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "[error] - disk full - mount=[/var]\nnot json at all\n"
    );
    assert_eq!(stats.lines_read, 4);
    assert_eq!(stats.unparsed, 1);
    assert_eq!(stats.filtered, 2);
}
