//! Wires configuration, flags and the pipeline together for one run.

use std::io::{IsTerminal, Write};

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use prettylog_core::config::PrettylogConfig;
use prettylog_pipeline::{FilterSpec, LogPipeline, RenderOptions};

use crate::cli::{Cli, FilterArgs, OutputArgs};
use crate::error::CliError;
use crate::logging;

/// Loads configuration, starts logging and prettifies stdin onto stdout.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli).await?;

    let level = if cli.debug {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    logging::init_tracing(
        logging::env_filter(level, cli.debug),
        &config.general.log_format,
    )?;
    debug!(?config, "effective configuration");

    let ignored = ignored_messages(&cli.filter, &config);
    if cli.show_ignored {
        write_ignored(&ignored, &mut std::io::stdout().lock())?;
        return Ok(());
    }

    if std::io::stdin().is_terminal() {
        return Err(CliError::Input(
            "expected piped input, e.g. `kubectl logs <pod> | prettylog`".to_owned(),
        ));
    }

    let spec = filter_spec(&cli.filter, &config)?;
    let pipeline = LogPipeline::builder()
        .config(&config)
        .filter_spec(spec)
        .options(render_options(&cli.output))
        .build();

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, stopping");
                cancel.cancel();
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    let result = pipeline
        .run(BufReader::new(tokio::io::stdin()), &mut stdout, cancel)
        .await;
    ctrl_c.abort();

    let stats = result?;
    debug!(%stats, "run complete");
    Ok(())
}

/// Discovers the config file and layers command-line overrides on top.
async fn load_config(cli: &Cli) -> Result<PrettylogConfig, CliError> {
    let mut config = PrettylogConfig::discover(cli.config.as_deref()).await?;
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format.as_str().to_owned();
    }
    config.validate()?;
    Ok(config)
}

/// Config file (or env) ignore patterns followed by `--ignore-msg` patterns.
pub fn ignored_messages(args: &FilterArgs, config: &PrettylogConfig) -> Vec<String> {
    let mut patterns = config.ignore.messages.clone();
    for pattern in &args.ignore_msg {
        if !patterns.contains(pattern) {
            patterns.push(pattern.clone());
        }
    }
    patterns
}

/// Builds and validates the filter spec from flags, using the configured severity table.
pub fn filter_spec(args: &FilterArgs, config: &PrettylogConfig) -> Result<FilterSpec, CliError> {
    let mut builder = FilterSpec::builder().ignore_messages(ignored_messages(args, config));

    if let Some(field) = &args.field {
        builder = builder.field(field.as_str());
    }
    if let Some(fields) = &args.fields {
        builder = builder.fields(fields);
    }
    if let Some(except) = &args.except {
        builder = builder.except(except);
    }
    if let Some(level) = &args.level {
        builder = builder.level(level.as_str());
    }
    if let Some(level) = &args.min_level {
        builder = builder.min_level(level.as_str());
    }
    if let Some(level) = &args.max_level {
        builder = builder.max_level(level.as_str());
    }
    if let Some(clauses) = &args.where_clauses {
        builder = builder.where_clauses(clauses.as_str());
    }
    if let Some(rule) = &args.trunc {
        builder = builder.truncate(rule.as_str());
    }
    if let Some(pattern) = &args.highlight_key {
        builder = builder.highlight_key(pattern.as_str());
    }
    if let Some(pattern) = &args.highlight_value {
        builder = builder.highlight_value(pattern.as_str());
    }

    Ok(builder.build(&config.severity)?)
}

pub fn render_options(args: &OutputArgs) -> RenderOptions {
    RenderOptions {
        multi_line: args.multi_line,
        show_data: !args.no_data,
        color: !args.no_color,
    }
}

/// Writes the ignore list, one pattern per line.
pub fn write_ignored(patterns: &[String], out: &mut impl Write) -> std::io::Result<()> {
    if patterns.is_empty() {
        writeln!(out, "(message ignore list is empty)")?;
        return Ok(());
    }
    for pattern in patterns {
        writeln!(out, "{pattern}")?;
    }
    out.flush()
}
