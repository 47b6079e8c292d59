use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidsnag")]
#[command(
    author,
    version,
    about = "Download a YouTube or Instagram video and describe it as JSON"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video URL to download
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the external tools are installed
    Doctor,

    /// Show configuration
    Config,
}
