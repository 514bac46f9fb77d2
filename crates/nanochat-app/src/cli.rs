use std::path::PathBuf;

use clap::Parser;

/// nanochat: chat with an on-device language model from the terminal.
#[derive(Parser, Debug)]
#[command(name = "nanochat", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error, or a full directive).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
