mod args;
mod commands;

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "vidsnag=info,vidsnag_core=info",
        1 => "vidsnag=debug,vidsnag_core=debug",
        2 => "vidsnag=trace,vidsnag_core=trace",
        _ => "trace",
    };

    // stdout carries the JSON document only
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => match cli.url {
            Some(url) => commands::download::run(&url, cli.config.as_deref()).await,
            None => Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "the following required arguments were not provided:\n  <URL>",
                )
                .exit(),
        },
    }
}
