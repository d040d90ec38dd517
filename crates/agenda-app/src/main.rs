//! agenda: command-line front end for the appointment assistant.

mod cli;
mod repl;
mod runtime;

use std::path::PathBuf;
use std::process::ExitCode;

use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use agenda_ai::ChatRequest;
use agenda_common::{AgendaError, Caller};
use agenda_config::{config_to_json, load_config, AgendaConfig};

use crate::cli::{Args, Command};

/// Load KEY=VALUE pairs from a `.env` file. Variables already set win.
fn load_dotenv() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        PathBuf::from(".env"),
        // Workspace root, two levels up from crates/agenda-app/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let line = line.strip_prefix("export ").unwrap_or(line);
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var_os(key).is_none() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

/// `--log-level` wins, then `RUST_LOG`, then the configured level.
fn init_tracing(args: &Args, config: &AgendaConfig) {
    let fallback = config.logging.level.as_directive();
    let filter = match args.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(fallback)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // Environment edits must happen before the runtime spawns worker threads.
    load_dotenv();
    let args = cli::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("agenda: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&args, &config);

    tracing::info!("agenda v{} starting", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            eprintln!("agenda: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(args.command, &config)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "agenda failed");
            eprintln!("agenda: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &AgendaConfig) -> Result<ExitCode, AgendaError> {
    match command {
        Command::Config => {
            println!("{}", config_to_json(config));
            Ok(ExitCode::SUCCESS)
        }
        Command::Tools => {
            let registry = runtime::build_registry()?;
            println!("{}", serde_json::to_string_pretty(registry.catalogue())?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Chat { user_id, user_name } => {
            let runtime = runtime::build(config)?;
            let caller = Caller {
                user_id,
                user_name,
            };
            repl::run(&runtime.orchestrator, caller).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask { file } => {
            let raw = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut raw = String::new();
                    tokio::io::stdin().read_to_string(&mut raw).await?;
                    raw
                }
            };
            let request: ChatRequest = serde_json::from_str(&raw)?;

            let runtime = runtime::build(config)?;
            let reply = runtime.orchestrator.respond(request).await;
            println!("{}", serde_json::to_string_pretty(&reply.body)?);

            if reply.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::warn!(status = reply.status, "request failed");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
