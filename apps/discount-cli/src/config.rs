//! # CLI Configuration
//!
//! Where the database lives and which company the commands act on.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DISCOUNT_DB_PATH=/var/lib/discount/discount.db                     │
//! │     DISCOUNT_COMPANY_ID=main                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config path/to/discount.toml                                     │
//! │     ~/.config/discount/discount.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, default company                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The log filter is read from `DISCOUNT_LOG` (or `RUST_LOG`) before the
//! configuration is loaded, so loading itself is logged.
//!
//! ## Configuration File Format
//! ```toml
//! # discount.toml
//! [database]
//! path = "/var/lib/discount/discount.db"
//! max_connections = 5
//!
//! [company]
//! id = "main"
//! ```
//!
//! Discount settings of the company (enable flag, discount account,
//! currency) are business data kept in the database, see `company set`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use discount_core::DEFAULT_COMPANY_ID;

/// Environment variable overriding the database path.
pub const ENV_DB_PATH: &str = "DISCOUNT_DB_PATH";
/// Environment variable overriding the company.
pub const ENV_COMPANY_ID: &str = "DISCOUNT_COMPANY_ID";
/// Environment variable holding the log filter.
pub const ENV_LOG: &str = "DISCOUNT_LOG";

const CONFIG_FILE: &str = "discount.toml";
const DATABASE_FILE: &str = "discount.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "discount", "discount")
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, created on first use.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[company]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    #[serde(default = "default_company_id")]
    pub id: String,
}

fn default_company_id() -> String {
    DEFAULT_COMPANY_ID.to_string()
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            id: default_company_id(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub company: CompanySettings,
}

impl AppConfig {
    /// Platform config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Loads configuration from file, applies environment overrides and
    /// validates the result.
    ///
    /// An explicit `config_path` must exist; the platform default may be
    /// missing.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                Self::from_toml(&std::fs::read_to_string(&path)?)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading config from file");
                    Self::from_toml(&std::fs::read_to_string(&path)?)?
                }
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document; missing sections take their defaults.
    pub fn from_toml(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies overrides from a variable lookup (the process environment
    /// outside of tests).
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }
        if let Some(id) = var(ENV_COMPANY_ID) {
            debug!(company_id = %id, "Overriding company from environment");
            self.company.id = id;
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(CliError::Config("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(CliError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.company.id.trim().is_empty() {
            return Err(CliError::Config("company.id must not be empty".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
