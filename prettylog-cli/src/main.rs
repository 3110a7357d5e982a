//! prettylog -- pretty-print structured JSON logs piped on stdin.

mod cli;
mod error;
mod logging;
mod run;

use clap::Parser;
use colored::Colorize;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run::execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            err.exit_code()
        }
    };

    // Exit without waiting on a stdin read still parked in the blocking pool.
    std::process::exit(code);
}
