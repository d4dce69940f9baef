// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! arscan - scan marker QR codes and fetch their AR assets.
//!
//! This is the binary entry point.

mod account;
mod context;
mod marker;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use arscan_config::ArscanConfig;
use arscan_core::{ArscanError, MarkerId, MarkerRecord};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::context::AppContext;

/// arscan - scan marker QR codes and fetch their AR assets.
#[derive(Parser, Debug)]
#[command(name = "arscan", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle scanned QR text: parse it, drop the cached copy, fetch the marker.
    Scan {
        /// Decoded QR text (marker URL or bare UUID).
        text: String,
    },
    /// Fetch marker data, using the cache when it is fresh.
    Fetch {
        marker_id: MarkerId,
        /// Ignore any cached copy.
        #[arg(long)]
        fresh: bool,
    },
    /// Inspect or clear the marker cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Show the signed-in user.
    Whoami {
        /// Ask the backend even when a user is stored.
        #[arg(long)]
        refresh: bool,
    },
    /// Forget the signed-in user.
    Logout,
    /// Publish or remove markers on the backend.
    Marker {
        #[command(subcommand)]
        action: MarkerCommands,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    /// Remove one cached marker, or all of them.
    Clear { marker_id: Option<MarkerId> },
    /// Show cached marker keys and their total size.
    Info {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum MarkerCommands {
    /// Upload a marker record.
    Upload {
        marker_id: MarkerId,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        video_url: String,
        #[arg(long)]
        pattern_url: Option<String>,
    },
    /// Delete a marker and its cached copy.
    Delete { marker_id: MarkerId },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.plain || !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    let loaded = match &cli.config {
        Some(path) => arscan_config::load_and_validate_path(path),
        None => arscan_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            arscan_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.app.log_level);

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: ArscanConfig) -> Result<ExitCode, ArscanError> {
    if let Commands::Config = command {
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| ArscanError::Internal(format!("failed to render config: {e}")))?;
        print!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    let ctx = AppContext::init(config).await?;
    let result = dispatch(&ctx, command).await;
    ctx.close().await?;
    result
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<ExitCode, ArscanError> {
    match command {
        Commands::Scan { text } => return marker::run_scan(ctx, &text).await,
        Commands::Fetch { marker_id, fresh } => marker::run_fetch(ctx, &marker_id, fresh).await?,
        Commands::Cache { action } => match action {
            CacheCommands::Clear { marker_id } => {
                marker::run_cache_clear(ctx, marker_id.as_ref()).await?
            }
            CacheCommands::Info { json } => marker::run_cache_info(ctx, json).await?,
        },
        Commands::Login { email } => account::run_login(ctx, &email).await?,
        Commands::Signup {
            email,
            first_name,
            last_name,
        } => account::run_signup(ctx, &email, &first_name, &last_name).await?,
        Commands::Whoami { refresh } => account::run_whoami(ctx, refresh).await?,
        Commands::Logout => account::run_logout(ctx).await?,
        Commands::Marker { action } => match action {
            MarkerCommands::Upload {
                marker_id,
                image_url,
                video_url,
                pattern_url,
            } => {
                let record = MarkerRecord {
                    image_url,
                    video_url,
                    pattern_url,
                };
                marker::run_upload(ctx, &marker_id, record).await?
            }
            MarkerCommands::Delete { marker_id } => marker::run_delete(ctx, &marker_id).await?,
        },
        Commands::Config => {}
    }
    Ok(ExitCode::SUCCESS)
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arscan={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from(["arscan", "cache", "clear", "abc-123"]).unwrap();
        match cli.command {
            Commands::Cache {
                action: CacheCommands::Clear { marker_id },
            } => assert_eq!(marker_id.unwrap().as_str(), "abc-123"),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["arscan", "--plain", "fetch", "m1", "--fresh"]).unwrap();
        assert!(cli.plain);
        assert!(matches!(cli.command, Commands::Fetch { fresh: true, .. }));
    }

    #[test]
    fn rejects_malformed_marker_id() {
        assert!(Cli::try_parse_from(["arscan", "fetch", "a/b"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = arscan_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.fetch.max_retries, 3);
    }
}
