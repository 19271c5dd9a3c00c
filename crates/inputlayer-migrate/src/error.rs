//! Error types for the migration system.

use std::path::PathBuf;

use inputlayer_core::error::CompileError;
use inputlayer_core::executor::ExecuteError;

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A revert target is not in the known migration list.
    #[error("Migration not found: {0}")]
    MigrationNotFound(String),

    /// A file matches the migration name pattern but is not a valid
    /// migration.
    #[error("Bad migration file '{path}': {message}")]
    BadMigrationFile {
        /// Path to the migration file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// An operation document carries an unknown `type` tag.
    #[error("Unknown operation type: {0}")]
    UnknownOperationType(String),

    /// Rule compilation failed while building a model state.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The target store rejected a command.
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    /// IO error reading or writing migration files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
