//! # Discount CLI Library
//!
//! Core library for the `discount` command-line application.
//!
//! ## Module Organization
//! ```text
//! discount_cli/
//! ├── lib.rs          ◄─── You are here (argument parsing, startup)
//! ├── config.rs       ◄─── AppConfig: database path, company
//! ├── error.rs        ◄─── CliError and exit codes
//! └── commands/
//!     ├── mod.rs      ◄─── Command tree, AppContext, shared parsers
//!     ├── company.rs  ◄─── company show | set
//!     ├── account.rs  ◄─── account add | list
//!     ├── rate.rs     ◄─── rate add
//!     ├── purchase.rs ◄─── po create | discount | show | bill
//!     └── bill.rs     ◄─── bill show | discount | refund | post
//! ```
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (stderr, so stdout stays JSON)
//! 3. Load configuration (file, then environment)
//! 4. Connect to database & run migrations
//! 5. Dispatch the command

pub mod commands;
pub mod config;
pub mod error;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::{dispatch, AppContext, Command};
use config::{AppConfig, ENV_LOG};
use discount_db::{Database, DbConfig};
use error::CliResult;

/// Purchase order and vendor bill discounts.
#[derive(Debug, Parser)]
#[command(name = "discount", version, about)]
pub struct Cli {
    /// Config file (default: platform config dir / discount.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Company to act on, overrides the config file and environment
    #[arg(long, global = true)]
    pub company: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Runs the CLI and maps the outcome to a process exit code.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::load(cli.config)?;
    if let Some(company) = cli.company {
        config.company.id = company;
        config.validate()?;
    }

    info!(
        path = %config.database.path.display(),
        company_id = %config.company.id,
        "Starting discount CLI"
    );

    let db = Database::new(
        DbConfig::new(&config.database.path).max_connections(config.database.max_connections),
    )
    .await?;
    let ctx = AppContext::new(db.clone(), config.company.id);

    debug!(command = ?cli.command, "Dispatching command");
    let result = dispatch(&ctx, cli.command).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `DISCOUNT_LOG` or `RUST_LOG` when set
/// - otherwise `info,discount=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info,discount=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
