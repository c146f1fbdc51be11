mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::EnvFilter;

use receipt2tx_core::supported_protocols;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "receipt2tx",
    version,
    about = "List and fetch receipt files from storage backends"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <config dir>/receipt2tx/receipt2tx.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Cli::command()
        .after_help(format!(
            "Supported backends: {}",
            supported_protocols().join(", ")
        ))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        commands::Command::List(args) => commands::list::run(args, &config).await,
        commands::Command::Fetch(args) => commands::fetch::run(args).await,
        commands::Command::Digest(args) => commands::digest::run(args, &config).await,
        commands::Command::Backends => commands::backends::run(),
    }
}
