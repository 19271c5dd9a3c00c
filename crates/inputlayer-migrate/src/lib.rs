//! Django-style schema migrations for the InputLayer knowledge-graph
//! engine.
//!
//! Migrations are numbered, named units of schema change. Each carries
//! an ordered operation list (every operation knowing both its forward
//! and backward commands) and a snapshot of the model state after
//! applying it.
//!
//! # Architecture
//!
//! - **[`state`]** - `ModelState`, the serializable snapshot of all
//!   relations, rules, and indexes; `ModelSet`, the application's model
//!   registry.
//! - **[`autodetector`]** - pure diff of two states into an ordered
//!   operation list.
//! - **[`operations`]** - the eight reversible operation variants.
//! - **[`loader`]** / **[`writer`]** - numbered migration files on disk.
//! - **[`recorder`]** - applied-migration tracking inside the target
//!   store itself.
//! - **[`executor`]** - applies pending migrations in order and reverts
//!   suffixes in reverse order, idempotently.
//! - **[`cli`]** - the `makemigrations` / `migrate` / `revert` /
//!   `showmigrations` command-line tool.
//!
//! # Example
//!
//! ```rust,ignore
//! use inputlayer_migrate::prelude::*;
//!
//! let models = ModelSet::new()
//!     .relation::<Employee>()
//!     .index(HnswIndex::new::<Document>("doc_idx", "embedding"));
//!
//! // makemigrations
//! cli::cmd_makemigrations(&models, Path::new("migrations"), None)?;
//!
//! // migrate
//! let applied = migrate(&mut client, &load_migrations(dir)?, None)?;
//! ```

pub mod autodetector;
pub mod cli;
pub mod error;
pub mod executor;
pub mod loader;
pub mod operations;
pub mod recorder;
pub mod state;
pub mod writer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::autodetector::detect_changes;
    pub use crate::error::{MigrateError, Result};
    pub use crate::executor::{apply_migration, migrate, revert_migration, revert_to};
    pub use crate::loader::{get_latest_state, get_next_number, load_migrations, MigrationInfo};
    pub use crate::operations::{operation_from_value, Operation};
    pub use crate::recorder::{MigrationRecorder, MIGRATION_RELATION};
    pub use crate::state::{IndexState, ModelSet, ModelState};
    pub use crate::writer::{generate_migration, migration_name, write_migration};
}
