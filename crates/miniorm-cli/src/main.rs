//! MiniORM demo driver.
//!
//! Bootstraps a SQLite `users` table and runs the demo queries against it.

mod demo;
mod formatter;
mod user;

use clap::Parser;
use formatter::OutputFormat;
use miniorm_core::{ContextConfig, DbContext, DEFAULT_CONNECTION};
use miniorm_sqlite::{DatabaseInitializer, SqliteError, SqliteExecutor};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use user::User;

/// MiniORM demo driver
#[derive(Parser, Debug)]
#[command(name = "miniorm")]
#[command(version, about = "Runs the MiniORM demo queries against a SQLite database")]
pub struct Args {
    /// Database path or `Data Source=<path>` connection string
    #[arg(short = 'd', long, default_value = DEFAULT_CONNECTION)]
    pub database: String,

    /// Drop and re-seed the users table before running
    #[arg(long)]
    pub reset: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Log every rendered statement
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("database setup failed: {0}")]
    Setup(#[from] SqliteError),

    #[error("query failed: {0}")]
    Query(#[from] miniorm_core::Error),
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Builds the log filter. A usable `RUST_LOG` wins outright; otherwise the
/// project's crates log at `info`, or `debug` with `--verbose`.
fn env_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            let level = if verbose { "debug" } else { "info" };
            EnvFilter::new(format!(
                "miniorm={level},miniorm_core={level},miniorm_sqlite={level}"
            ))
        })
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), verbose))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    init_tracing(args.verbose);

    let initializer = DatabaseInitializer::new(args.database.clone());
    let seeded = if args.reset {
        initializer.reset::<User>(&user::seed())?
    } else {
        initializer.initialize::<User>(&user::seed())?
    };
    info!(database = %args.database, seeded, "database ready");

    let config = ContextConfig::new(args.database).with_log_statements(args.verbose);
    let ctx = DbContext::new(config, SqliteExecutor::new());

    let sections = demo::run(&ctx)?;
    let formatter = formatter::create_formatter(args.format);
    println!("{}", formatter.format_sections(&sections));
    Ok(())
}
