//! Migration loader: discover and parse migration files from a
//! directory.
//!
//! A migration file is a JSON document named `NNNN_<suffix>.json` with
//! top-level `dependencies`, `operations`, and `state` keys. Files whose
//! names do not match the pattern are ignored; files that match but fail
//! to parse abort loading.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MigrateError, Result};
use crate::operations::{operation_from_value, Operation};
use crate::state::ModelState;

/// Metadata about a loaded migration file.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationInfo {
    /// Migration name, e.g. `0001_initial`.
    pub name: String,
    /// Numeric prefix, e.g. `1`.
    pub number: u32,
    /// File name, e.g. `0001_initial.json`.
    pub filename: String,
    /// Names of migrations that must be applied first.
    pub dependencies: Vec<String>,
    /// The migration's operations, in application order.
    pub operations: Vec<Operation>,
    /// The model state after this migration.
    pub state: ModelState,
}

fn migration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{4})_.+\.json$").expect("valid migration pattern"))
}

/// Discovers and loads all migration files from a directory, sorted by
/// numeric prefix. A missing directory yields an empty list.
///
/// # Errors
///
/// Returns [`MigrateError::BadMigrationFile`] when a matching file is
/// not a valid migration document, and
/// [`MigrateError::UnknownOperationType`] when an operation tag is
/// unrecognized.
pub fn load_migrations(directory: &Path) -> Result<Vec<MigrationInfo>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = fs::read_dir(directory)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|entry| entry.path().is_file())
        .collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let mut migrations = Vec::new();
    for entry in entries {
        let filename = entry.file_name().to_string_lossy().into_owned();
        let Some(captures) = migration_pattern().captures(&filename) else {
            continue;
        };
        let number: u32 = captures[1].parse().expect("four digits fit in u32");
        let name = filename
            .strip_suffix(".json")
            .expect("pattern guarantees extension")
            .to_string();

        let path = entry.path();
        let text = fs::read_to_string(&path)?;
        let document: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| MigrateError::BadMigrationFile {
                path: path.clone(),
                message: e.to_string(),
            })?;

        migrations.push(parse_migration(&path, name, number, filename, &document)?);
    }

    migrations.sort_by_key(|m| m.number);
    Ok(migrations)
}

fn parse_migration(
    path: &Path,
    name: String,
    number: u32,
    filename: String,
    document: &serde_json::Value,
) -> Result<MigrationInfo> {
    let bad = |message: &str| MigrateError::BadMigrationFile {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let dependencies: Vec<String> = match document.get("dependencies") {
        Some(deps) => serde_json::from_value(deps.clone())
            .map_err(|_| bad("'dependencies' must be a list of migration names"))?,
        None => return Err(bad("missing 'dependencies'")),
    };

    let raw_operations = document
        .get("operations")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| bad("missing 'operations' list"))?;
    let operations: Vec<Operation> = raw_operations
        .iter()
        .map(operation_from_value)
        .collect::<Result<_>>()?;

    let state: ModelState = match document.get("state") {
        Some(state) => serde_json::from_value(state.clone())
            .map_err(|e| bad(&format!("invalid 'state': {e}")))?,
        None => return Err(bad("missing 'state'")),
    };

    Ok(MigrationInfo {
        name,
        number,
        filename,
        dependencies,
        operations,
        state,
    })
}

/// The embedded state of the most recent migration, or an empty state
/// when no migrations exist.
///
/// # Errors
///
/// Propagates loading failures.
pub fn get_latest_state(directory: &Path) -> Result<ModelState> {
    let migrations = load_migrations(directory)?;
    Ok(migrations
        .into_iter()
        .next_back()
        .map_or_else(ModelState::new, |m| m.state))
}

/// The next migration number: 1 for an empty directory, otherwise the
/// highest existing number plus one.
///
/// # Errors
///
/// Propagates loading failures.
pub fn get_next_number(directory: &Path) -> Result<u32> {
    let migrations = load_migrations(directory)?;
    Ok(migrations.last().map_or(1, |m| m.number + 1))
}
