//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "arlmcp")]
#[command(author, version, about = "MCP server for the ARL asset reconnaissance platform")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// ARL base URL (overrides config file)
    #[arg(long)]
    pub url: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
