//! # CLI Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  discount bill discount BILL/2026/0001 --type percent --rate 120        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Handler                                                 │  │
//! │  │  Result<T, CliError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::NotFound(...) ───────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::Validation ────── CliError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: "error: Validation error: Please enter percentage value ..."  │
//! │  exit code: 2                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use discount_core::{CoreError, ValidationError};
use discount_db::DbError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file or environment is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Company discount settings were never saved.
    #[error("Company '{0}' is not configured, run `discount company set` first")]
    NotConfigured(String),

    /// Business rule rejected the command.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage layer failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Reading the config file or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// | Code | Meaning                      |
    /// |------|------------------------------|
    /// | 2    | Rejected input or rule       |
    /// | 3    | Document or setting missing  |
    /// | 4    | Database failure             |
    /// | 78   | Configuration error          |
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Core(_) => 2,
            CliError::NotConfigured(_) => 3,
            CliError::Db(DbError::NotFound { .. }) => 3,
            CliError::Db(DbError::UniqueViolation { .. } | DbError::InvalidData { .. }) => 2,
            CliError::Db(err) => {
                tracing::error!(error = %err, "Database operation failed");
                4
            }
            CliError::Config(_) => 78,
            CliError::Io(_) | CliError::Output(_) => 1,
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(err.to_string())
    }
}
