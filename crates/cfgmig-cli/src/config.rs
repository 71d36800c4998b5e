//! Run configuration.
//!
//! Values are resolved in increasing priority from:
//! - the JSON config file (`--config`, else `$KBC_DATADIR/config.json`,
//!   else `data/config.json`)
//! - environment variables (`KBC_TOKEN`, `KBC_URL`, `KBC_BRANCH_ID`,
//!   `MIGRATION_ORIGIN`, `MIGRATION_DESTINATION`)
//! - command-line flags (`--origin`, `--destination`)
//!
//! # Config file
//!
//! ```json
//! {
//!   "action": "run",
//!   "parameters": {
//!     "#kbc_token": "...",
//!     "kbc_url": "https://connection.keboola.com",
//!     "branch_id": "default",
//!     "origin": "keboola.ex-facebook",
//!     "destination": "keboola.ex-facebook-pages"
//!   }
//! }
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use cfgmig_core::defaults::{BRANCH_ID, CONFIG_FILE, DATA_DIR};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Missing configuration: {0}")]
    Missing(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Action to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Migrate configurations.
    #[default]
    Run,
    /// List migration status of origin configurations.
    Status,
    /// List registered migrations.
    SupportedMigrations,
}

impl FromStr for Action {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Self::Run),
            "status" => Ok(Self::Status),
            "supported-migrations" => Ok(Self::SupportedMigrations),
            _ => Err(ConfigError::InvalidAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Status => write!(f, "status"),
            Self::SupportedMigrations => write!(f, "supported-migrations"),
        }
    }
}

/// `parameters` object of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameters {
    #[serde(rename = "#kbc_token", default)]
    pub kbc_token: Option<String>,
    #[serde(default)]
    pub kbc_url: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Verbose logging.
    #[serde(default)]
    pub debug: bool,
}

/// Config file layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub action: Option<Action>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// Fully resolved run configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub action: Action,
    pub kbc_token: String,
    pub kbc_url: String,
    pub branch_id: String,
    pub origin: String,
    pub destination: Option<String>,
    pub debug: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("action", &self.action)
            .field("kbc_token", &"<redacted>")
            .field("kbc_url", &self.kbc_url)
            .field("branch_id", &self.branch_id)
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("debug", &self.debug)
            .finish()
    }
}

impl AppConfig {
    /// Load from the config file, process environment and overrides.
    pub fn load(overrides: Overrides) -> ConfigResult<Self> {
        let file = match &overrides.config_path {
            Some(path) => ConfigFile::from_file(path)?,
            None => {
                let path = default_config_path(|key| std::env::var(key).ok());
                if path.exists() {
                    ConfigFile::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "No config file, using environment only");
                    ConfigFile::default()
                }
            }
        };
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge the three sources. `env` looks up an environment variable.
    pub fn resolve<F>(file: ConfigFile, env: F, overrides: Overrides) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let action = match overrides.action {
            Some(action) => action,
            None => file
                .action
                .as_deref()
                .filter(|a| !a.is_empty())
                .map(Action::from_str)
                .transpose()?
                .unwrap_or_default(),
        };

        let params = file.parameters;
        let pick = |cli: Option<String>, var: &str, from_file: Option<String>| {
            non_empty(cli)
                .or_else(|| non_empty(env(var)))
                .or_else(|| non_empty(from_file))
        };

        let kbc_token = pick(None, "KBC_TOKEN", params.kbc_token)
            .ok_or_else(|| ConfigError::Missing("Storage API token (#kbc_token)".to_string()))?;
        let kbc_url = pick(None, "KBC_URL", params.kbc_url)
            .ok_or_else(|| ConfigError::Missing("Storage API URL (kbc_url)".to_string()))?;
        let branch_id = pick(None, "KBC_BRANCH_ID", params.branch_id)
            .unwrap_or_else(|| BRANCH_ID.to_string());
        let origin = pick(overrides.origin, "MIGRATION_ORIGIN", params.origin).unwrap_or_default();
        let destination = pick(
            overrides.destination,
            "MIGRATION_DESTINATION",
            params.destination,
        );

        Ok(Self {
            action,
            kbc_token,
            kbc_url,
            branch_id,
            origin,
            destination,
            debug: params.debug,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `$KBC_DATADIR/config.json`, falling back to `data/config.json`.
pub fn default_config_path<F>(env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let data_dir = non_empty(env("KBC_DATADIR")).unwrap_or_else(|| DATA_DIR.to_string());
    Path::new(&data_dir).join(CONFIG_FILE)
}
