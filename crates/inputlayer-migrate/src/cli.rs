//! Migration CLI.
//!
//! Applications embed the CLI in a three-line binary that registers
//! their models:
//!
//! ```rust,ignore
//! fn main() {
//!     let models = ModelSet::new().relation::<Employee>();
//!     std::process::exit(inputlayer_migrate::cli::run_with_models(Some(&models)));
//! }
//! ```
//!
//! `migrate`, `revert`, and `showmigrations` only need migration files
//! and a connection, so the standalone `inputlayer-migrate` binary
//! serves them without any registered models.

use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use inputlayer_client::BlockingConnection;
use inputlayer_core::executor::Execute;

use crate::autodetector::detect_changes;
use crate::error::Result;
use crate::executor::{migrate, revert_to};
use crate::loader::{get_latest_state, get_next_number, load_migrations};
use crate::recorder::MigrationRecorder;
use crate::state::{ModelSet, ModelState};
use crate::writer::write_migration;

/// InputLayer migration management tool.
#[derive(Parser, Debug)]
#[command(name = "inputlayer-migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory for migration files.
    #[arg(long, default_value = "migrations")]
    pub migrations_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Connection parameters shared by the server-facing subcommands.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// WebSocket URL (e.g. ws://localhost:8080/ws).
    #[arg(long)]
    pub url: String,

    /// Knowledge graph name.
    #[arg(long)]
    pub kg: String,

    /// Username for authentication.
    #[arg(long)]
    pub username: Option<String>,

    /// Password for authentication.
    #[arg(long)]
    pub password: Option<String>,

    /// API key for authentication.
    #[arg(long, env = "INPUTLAYER_API_KEY")]
    pub api_key: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new migration by diffing registered models against the
    /// latest migration state.
    Makemigrations {
        /// Custom migration name suffix.
        #[arg(long)]
        name: Option<String>,
    },

    /// Apply pending migrations.
    Migrate {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Stop after applying this migration.
        #[arg(long)]
        target: Option<String>,
    },

    /// Revert migrations back to (but not including) a target.
    Revert {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Migration name to revert to (e.g. 0001_initial).
        target: String,
    },

    /// Show migration status.
    Showmigrations {
        #[command(flatten)]
        conn: ConnectionArgs,
    },
}

/// Generates a migration file from the registered models. Returns the
/// written path, or `None` when nothing changed.
///
/// # Errors
///
/// Propagates loading, compilation, and filesystem failures.
pub fn cmd_makemigrations(
    models: &ModelSet,
    migrations_dir: &Path,
    name: Option<&str>,
) -> Result<Option<PathBuf>> {
    let new_state = ModelState::from_models(models)?;
    let old_state = get_latest_state(migrations_dir)?;

    let operations = detect_changes(&old_state, &new_state);
    if operations.is_empty() {
        return Ok(None);
    }

    let number = get_next_number(migrations_dir)?;
    let existing = load_migrations(migrations_dir)?;
    let dependencies: Vec<String> = existing.last().map(|m| m.name.clone()).into_iter().collect();

    let path = write_migration(
        migrations_dir,
        number,
        &operations,
        &new_state,
        &dependencies,
        name,
    )?;

    println!("Created migration: {}", path.display());
    for op in &operations {
        println!("  - {}", op.describe());
    }

    Ok(Some(path))
}

/// Applies pending migrations, printing the applied names.
///
/// # Errors
///
/// Propagates loading and execution failures.
pub fn cmd_migrate<E: Execute>(
    kg: &mut E,
    migrations_dir: &Path,
    target: Option<&str>,
) -> Result<Vec<String>> {
    let migrations = load_migrations(migrations_dir)?;
    if migrations.is_empty() {
        println!("No migrations found.");
        return Ok(Vec::new());
    }

    let applied = migrate(kg, &migrations, target)?;
    if applied.is_empty() {
        println!("No migrations to apply.");
    } else {
        println!("Applied {} migration(s):", applied.len());
        for name in &applied {
            println!("  [X] {name}");
        }
    }
    Ok(applied)
}

/// Reverts migrations back to `target`, printing the reverted names.
///
/// # Errors
///
/// Returns [`MigrateError::MigrationNotFound`](crate::error::MigrateError::MigrationNotFound)
/// for an unknown target, and propagates loading and execution failures.
pub fn cmd_revert<E: Execute>(
    kg: &mut E,
    migrations_dir: &Path,
    target: &str,
) -> Result<Vec<String>> {
    let migrations = load_migrations(migrations_dir)?;
    let reverted = revert_to(kg, &migrations, target)?;
    if reverted.is_empty() {
        println!("Nothing to revert.");
    } else {
        println!("Reverted {} migration(s):", reverted.len());
        for name in &reverted {
            println!("  [ ] {name}");
        }
    }
    Ok(reverted)
}

/// Prints every known migration with its applied status.
///
/// # Errors
///
/// Propagates loading and execution failures.
pub fn cmd_showmigrations<E: Execute>(kg: &mut E, migrations_dir: &Path) -> Result<()> {
    let migrations = load_migrations(migrations_dir)?;
    if migrations.is_empty() {
        println!("No migrations found.");
        return Ok(());
    }

    let applied: Vec<String> = {
        let mut recorder = MigrationRecorder::new(kg);
        recorder.ensure_schema()?;
        recorder.get_applied()?
    };

    for migration in &migrations {
        let mark = if applied.contains(&migration.name) {
            "X"
        } else {
            " "
        };
        println!("  [{mark}] {}", migration.name);
    }
    Ok(())
}

fn connect(conn: &ConnectionArgs) -> inputlayer_client::Result<BlockingConnection> {
    let mut client = BlockingConnection::connect(&conn.url)?;
    if let Some(api_key) = &conn.api_key {
        client.authenticate(api_key)?;
    } else if let (Some(username), Some(password)) = (&conn.username, &conn.password) {
        client.login(username, password)?;
    }
    client.use_kg(&conn.kg)?;
    Ok(client)
}

/// Parses `std::env::args` and runs the CLI, returning the process exit
/// code. `models` backs `makemigrations`; pass `None` when embedding is
/// not possible and only the connection subcommands are needed.
#[must_use]
pub fn run_with_models(models: Option<&ModelSet>) -> i32 {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    // A second call in the same process keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);

    let Some(command) = cli.command else {
        Cli::command().print_help().ok();
        return 1;
    };

    let outcome = match command {
        Commands::Makemigrations { name } => match models {
            Some(models) if !models.is_empty() => {
                cmd_makemigrations(models, &cli.migrations_dir, name.as_deref()).map(|written| {
                    if written.is_none() {
                        println!("No changes detected.");
                    }
                })
            }
            _ => {
                eprintln!(
                    "No models registered. Embed the CLI in your application with \
                     cli::run_with_models(Some(&models))."
                );
                return 1;
            }
        },

        Commands::Migrate { conn, target } => match connect(&conn) {
            Ok(mut client) => {
                cmd_migrate(&mut client, &cli.migrations_dir, target.as_deref()).map(|_| ())
            }
            Err(e) => {
                eprintln!("Connection failed: {e}");
                return 2;
            }
        },

        Commands::Revert { conn, target } => match connect(&conn) {
            Ok(mut client) => cmd_revert(&mut client, &cli.migrations_dir, &target).map(|_| ()),
            Err(e) => {
                eprintln!("Connection failed: {e}");
                return 2;
            }
        },

        Commands::Showmigrations { conn } => match connect(&conn) {
            Ok(mut client) => cmd_showmigrations(&mut client, &cli.migrations_dir),
            Err(e) => {
                eprintln!("Connection failed: {e}");
                return 2;
            }
        },
    };

    match outcome {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    }
}
