//! cfgmig: migrate component configurations between components.
//!
//! Results are printed as JSON on stdout; logs go to stderr.
//!
//! Exit codes: `0` success, `1` user-facing error (bad input, unsupported
//! origin, failed record), `2` anything else.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cfgmig_client::{StorageClient, StorageConfig};
use cfgmig_core::MigrationRegistry;
use cfgmig_engine::{supported_migrations, EngineConfig, MigrationEngine};

use crate::config::{Action, AppConfig, ConfigError, Overrides};

#[derive(Parser)]
#[command(name = "cfgmig")]
#[command(author, version, about = "Migrate component configurations")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the JSON config file (default: $KBC_DATADIR/config.json or data/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Origin component ID
    #[arg(long, global = true)]
    origin: Option<String>,

    /// Destination component ID (default: the registered destination)
    #[arg(long, global = true)]
    destination: Option<String>,

    /// Action to run; defaults to the config file `action`, then `run`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Migrate every not-yet-migrated configuration of the origin
    Run,
    /// Show the migration status of each origin configuration
    Status,
    /// List registered origin/destination pairs
    SupportedMigrations,
}

impl From<Commands> for Action {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Run => Action::Run,
            Commands::Status => Action::Status,
            Commands::SupportedMigrations => Action::SupportedMigrations,
        }
    }
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            action: self.command.map(Action::from),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let loaded = AppConfig::load(cli.overrides());
    let debug = loaded.as_ref().map(|c| c.debug).unwrap_or(false);
    let _log_guard = init_tracing(debug);

    let result = match loaded {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "cfgmig failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Initialize tracing on stderr, or on a daily-rotated file when `LOG_FILE`
/// is set.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: "info", or "debug" when the
///                 config file sets `parameters.debug`)
fn init_tracing(debug: bool) -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let default_level = if debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("cfgmig.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(action = %config.action, origin_id = %config.origin, "Starting");

    let storage = StorageConfig::new(&config.kbc_url, &config.kbc_token)
        .with_branch(&config.branch_id);
    let client = Arc::new(StorageClient::new(storage)?);
    let registry = MigrationRegistry::builtin();

    match config.action {
        Action::Run => {
            let destination = resolve_destination(&config, &registry);
            let engine = MigrationEngine::new(client, registry, EngineConfig::from_env());
            let report = engine.execute(&config.origin, &destination).await?;
            print_json(&report)
        }
        Action::Status => {
            let engine = MigrationEngine::new(client, registry, EngineConfig::from_env());
            let listing = engine.status(&config.origin).await?;
            print_json(&listing)
        }
        Action::SupportedMigrations => {
            let migrations = supported_migrations(&registry, client.as_ref()).await;
            print_json(&migrations)
        }
    }
}

/// Explicit destination, else the registered one. Empty when neither is
/// known; the engine then rejects the run.
fn resolve_destination(config: &AppConfig, registry: &MigrationRegistry) -> String {
    config
        .destination
        .clone()
        .or_else(|| registry.destination_for(&config.origin).map(str::to_string))
        .unwrap_or_default()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<cfgmig_core::Error>() {
        return if e.is_user_facing() { 1 } else { 2 };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return 1;
    }
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgmig_core::Error;

    fn app_config(origin: &str, destination: Option<&str>) -> AppConfig {
        AppConfig {
            action: Action::Run,
            kbc_token: "t".into(),
            kbc_url: "https://connection.keboola.com".into(),
            branch_id: "default".into(),
            origin: origin.into(),
            destination: destination.map(str::to_string),
            debug: false,
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["cfgmig", "status", "--origin", "keboola.ex-facebook"])
            .unwrap();
        assert_eq!(cli.command, Some(Commands::Status));
        assert_eq!(cli.origin.as_deref(), Some("keboola.ex-facebook"));

        let cli = Cli::try_parse_from(["cfgmig", "supported-migrations"]).unwrap();
        assert_eq!(cli.command, Some(Commands::SupportedMigrations));
    }

    #[test]
    fn test_cli_without_subcommand() {
        let cli = Cli::try_parse_from(["cfgmig", "--config", "/tmp/config.json"]).unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.action, None);
        assert_eq!(overrides.config_path, Some(PathBuf::from("/tmp/config.json")));
    }

    #[test]
    fn test_destination_defaults_to_registry() {
        let registry = MigrationRegistry::builtin();
        assert_eq!(
            resolve_destination(&app_config("keboola.ex-facebook", None), &registry),
            "keboola.ex-facebook-pages"
        );
        assert_eq!(
            resolve_destination(&app_config("keboola.ex-facebook", Some("custom")), &registry),
            "custom"
        );
        assert_eq!(
            resolve_destination(&app_config("unknown", None), &registry),
            ""
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code(&anyhow::Error::from(Error::UnsupportedOrigin("x".into()))),
            1
        );
        assert_eq!(
            exit_code(&anyhow::Error::from(Error::User("failed".into()))),
            1
        );
        assert_eq!(
            exit_code(&anyhow::Error::from(Error::Api {
                status: 500,
                message: "boom".into()
            })),
            2
        );
        assert_eq!(
            exit_code(&anyhow::Error::from(ConfigError::Missing("token".into()))),
            1
        );
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 2);
    }
}
