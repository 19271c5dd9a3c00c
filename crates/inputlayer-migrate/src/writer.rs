//! Migration writer: emit migration files the loader reads back.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::operations::Operation;
use crate::state::ModelState;

#[derive(Serialize)]
struct MigrationDocument<'a> {
    dependencies: &'a [String],
    operations: &'a [Operation],
    state: &'a ModelState,
}

/// Builds the migration name for a number and suffix, e.g.
/// `0042_add_documents`.
#[must_use]
pub fn migration_name(number: u32, suffix: &str) -> String {
    format!("{number:04}_{suffix}")
}

/// Generates a migration file.
///
/// The default suffix is `initial` for migration 1 and `auto` otherwise;
/// `name_suffix` overrides it. Returns `(filename, content)`; the
/// content is a JSON document with relations, rules, and indexes sorted
/// by name, and loading it back yields an equal migration.
#[must_use]
pub fn generate_migration(
    number: u32,
    operations: &[Operation],
    state: &ModelState,
    dependencies: &[String],
    name_suffix: Option<&str>,
) -> (String, String) {
    let suffix = match name_suffix {
        Some(suffix) => suffix,
        None if number == 1 => "initial",
        None => "auto",
    };
    let filename = format!("{}.json", migration_name(number, suffix));

    let document = MigrationDocument {
        dependencies,
        operations,
        state,
    };
    let mut content =
        serde_json::to_string_pretty(&document).expect("migration document serializes");
    content.push('\n');

    (filename, content)
}

/// Generates a migration file and writes it into `directory`, creating
/// the directory when needed. Returns the file path.
///
/// # Errors
///
/// Propagates filesystem failures.
pub fn write_migration(
    directory: &Path,
    number: u32,
    operations: &[Operation],
    state: &ModelState,
    dependencies: &[String],
    name_suffix: Option<&str>,
) -> Result<PathBuf> {
    let (filename, content) =
        generate_migration(number, operations, state, dependencies, name_suffix);
    fs::create_dir_all(directory)?;
    let path = directory.join(filename);
    fs::write(&path, content)?;
    Ok(path)
}
