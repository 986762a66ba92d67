/*
[INPUT]:  CLI arguments, YAML configuration file
[OUTPUT]: Wallet login, session status, profile and logout results on stdout
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or startup flow
*/

mod commands;
mod config;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AuthConfig;

#[derive(Parser, Debug)]
#[command(name = "wallet-auth", version, about = "Wallet sign-in and session inspection")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the wallet handshake and persist the session
    Login,
    /// Inspect the persisted session token without any network call
    Status,
    /// Confirm the persisted session by fetching the profile
    Profile,
    /// Clear the persisted session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        command = ?args.command,
        "starting wallet-auth"
    );

    let config = load_config(&args.config_path)?;
    info!(
        base_url = %config.backend.base_url,
        session_file = %config.session_file.display(),
        "configuration loaded"
    );

    match args.command {
        Command::Login => commands::login(&config).await,
        Command::Status => commands::status(&config),
        Command::Profile => commands::profile(&config).await,
        Command::Logout => commands::logout(&config),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<AuthConfig> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    AuthConfig::from_file(path_str).context("load config")
}
