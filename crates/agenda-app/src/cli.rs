use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Agenda: an appointment assistant you talk to.
#[derive(Parser, Debug)]
#[command(name = "agenda", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error). Takes precedence over RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Talk to the assistant interactively.
    Chat {
        /// User id forwarded to the tools.
        #[arg(long)]
        user_id: Option<String>,

        /// Name the assistant addresses you by.
        #[arg(long)]
        user_name: Option<String>,
    },
    /// Answer one chat request read as JSON from FILE (or stdin).
    Ask {
        file: Option<PathBuf>,
    },
    /// Print the tool catalogue as JSON.
    Tools,
    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Args {
    Args::parse()
}
