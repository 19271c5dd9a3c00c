//! Migration operations.
//!
//! Each operation is an atomic schema, rule, or index change carrying
//! both its forward and backward command lists, so every migration can be
//! applied and reverted without consulting external state.

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

fn default_metric() -> String {
    String::from("cosine")
}

const fn default_m() -> u32 {
    16
}

const fn default_ef_construction() -> u32 {
    100
}

const fn default_ef_search() -> u32 {
    50
}

/// A single migration operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// Create a new relation with a typed schema.
    CreateRelation {
        /// Relation name.
        name: String,
        /// `(column, storage type)` pairs in declaration order.
        columns: Vec<(String, String)>,
    },

    /// Drop a relation (columns kept for reversibility).
    DropRelation {
        /// Relation name.
        name: String,
        /// `(column, storage type)` pairs in declaration order.
        columns: Vec<(String, String)>,
    },

    /// Create a rule with one or more clauses.
    CreateRule {
        /// Rule name.
        name: String,
        /// Compiled clause texts.
        clauses: Vec<String>,
    },

    /// Drop a rule (clauses kept for reversibility).
    DropRule {
        /// Rule name.
        name: String,
        /// Compiled clause texts.
        clauses: Vec<String>,
    },

    /// Replace a rule's clause list (drop + recreate).
    ReplaceRule {
        /// Rule name.
        name: String,
        /// Previous clause texts.
        old_clauses: Vec<String>,
        /// New clause texts.
        new_clauses: Vec<String>,
    },

    /// Create an HNSW vector index.
    CreateIndex {
        /// Index name.
        name: String,
        /// Indexed relation.
        relation: String,
        /// Indexed column.
        column: String,
        /// Distance metric.
        #[serde(default = "default_metric")]
        metric: String,
        /// Graph connectivity parameter.
        #[serde(default = "default_m")]
        m: u32,
        /// Construction-time search width.
        #[serde(default = "default_ef_construction")]
        ef_construction: u32,
        /// Query-time search width.
        #[serde(default = "default_ef_search")]
        ef_search: u32,
    },

    /// Drop an HNSW vector index (parameters kept for reversibility).
    DropIndex {
        /// Index name.
        name: String,
        /// Indexed relation.
        relation: String,
        /// Indexed column.
        column: String,
        /// Distance metric.
        #[serde(default = "default_metric")]
        metric: String,
        /// Graph connectivity parameter.
        #[serde(default = "default_m")]
        m: u32,
        /// Construction-time search width.
        #[serde(default = "default_ef_construction")]
        ef_construction: u32,
        /// Query-time search width.
        #[serde(default = "default_ef_search")]
        ef_search: u32,
    },

    /// Run arbitrary Datalog commands (escape hatch).
    RunDatalog {
        /// Forward command list.
        forward: Vec<String>,
        /// Backward command list.
        backward: Vec<String>,
    },
}

fn schema_command(name: &str, columns: &[(String, String)]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|(col, tp)| format!("{col}: {tp}"))
        .collect();
    format!("+{name}({})", parts.join(", "))
}

fn index_create_command(
    name: &str,
    relation: &str,
    column: &str,
    metric: &str,
    m: u32,
    ef_construction: u32,
    ef_search: u32,
) -> String {
    format!(
        ".index create {name} on {relation}({column}) type hnsw metric {metric} \
         m {m} ef_construction {ef_construction} ef_search {ef_search}"
    )
}

impl Operation {
    /// Creates a `CreateRelation` operation.
    #[must_use]
    pub fn create_relation(name: impl Into<String>, columns: Vec<(String, String)>) -> Self {
        Self::CreateRelation {
            name: name.into(),
            columns,
        }
    }

    /// Creates a `DropRelation` operation.
    #[must_use]
    pub fn drop_relation(name: impl Into<String>, columns: Vec<(String, String)>) -> Self {
        Self::DropRelation {
            name: name.into(),
            columns,
        }
    }

    /// Creates a `CreateRule` operation.
    #[must_use]
    pub fn create_rule(name: impl Into<String>, clauses: Vec<String>) -> Self {
        Self::CreateRule {
            name: name.into(),
            clauses,
        }
    }

    /// Creates a `DropRule` operation.
    #[must_use]
    pub fn drop_rule(name: impl Into<String>, clauses: Vec<String>) -> Self {
        Self::DropRule {
            name: name.into(),
            clauses,
        }
    }

    /// Creates a `ReplaceRule` operation.
    #[must_use]
    pub fn replace_rule(
        name: impl Into<String>,
        old_clauses: Vec<String>,
        new_clauses: Vec<String>,
    ) -> Self {
        Self::ReplaceRule {
            name: name.into(),
            old_clauses,
            new_clauses,
        }
    }

    /// Creates a `RunDatalog` operation.
    #[must_use]
    pub fn run_datalog(forward: Vec<String>, backward: Vec<String>) -> Self {
        Self::RunDatalog { forward, backward }
    }

    /// The commands that apply this operation.
    #[must_use]
    pub fn forward_commands(&self) -> Vec<String> {
        match self {
            Self::CreateRelation { name, columns } => vec![schema_command(name, columns)],
            Self::DropRelation { name, .. } => vec![format!(".rel drop {name}")],
            Self::CreateRule { clauses, .. } => clauses.clone(),
            Self::DropRule { name, .. } => vec![format!(".rule drop {name}")],
            Self::ReplaceRule {
                name, new_clauses, ..
            } => {
                let mut cmds = vec![format!(".rule drop {name}")];
                cmds.extend(new_clauses.iter().cloned());
                cmds
            }
            Self::CreateIndex {
                name,
                relation,
                column,
                metric,
                m,
                ef_construction,
                ef_search,
            } => vec![index_create_command(
                name,
                relation,
                column,
                metric,
                *m,
                *ef_construction,
                *ef_search,
            )],
            Self::DropIndex { name, .. } => vec![format!(".index drop {name}")],
            Self::RunDatalog { forward, .. } => forward.clone(),
        }
    }

    /// The commands that revert this operation.
    #[must_use]
    pub fn backward_commands(&self) -> Vec<String> {
        match self {
            Self::CreateRelation { name, .. } => vec![format!(".rel drop {name}")],
            Self::DropRelation { name, columns } => vec![schema_command(name, columns)],
            Self::CreateRule { name, .. } => vec![format!(".rule drop {name}")],
            Self::DropRule { clauses, .. } => clauses.clone(),
            Self::ReplaceRule {
                name, old_clauses, ..
            } => {
                let mut cmds = vec![format!(".rule drop {name}")];
                cmds.extend(old_clauses.iter().cloned());
                cmds
            }
            Self::CreateIndex { name, .. } => vec![format!(".index drop {name}")],
            Self::DropIndex {
                name,
                relation,
                column,
                metric,
                m,
                ef_construction,
                ef_search,
            } => vec![index_create_command(
                name,
                relation,
                column,
                metric,
                *m,
                *ef_construction,
                *ef_search,
            )],
            Self::RunDatalog { backward, .. } => backward.clone(),
        }
    }

    /// A human-readable description of this operation.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::CreateRelation { name, .. } => format!("Create relation {name}"),
            Self::DropRelation { name, .. } => format!("Drop relation {name}"),
            Self::CreateRule { name, clauses } => {
                let n = clauses.len();
                let plural = if n == 1 { "" } else { "s" };
                format!("Create rule {name} ({n} clause{plural})")
            }
            Self::DropRule { name, .. } => format!("Drop rule {name}"),
            Self::ReplaceRule { name, .. } => format!("Replace rule {name}"),
            Self::CreateIndex {
                name,
                relation,
                column,
                ..
            } => format!("Create index {name} on {relation}({column})"),
            Self::DropIndex { name, .. } => format!("Drop index {name}"),
            Self::RunDatalog { forward, .. } => {
                let n = forward.len();
                let plural = if n == 1 { "" } else { "s" };
                format!("Run {n} custom Datalog command{plural}")
            }
        }
    }
}

const KNOWN_OPERATION_TYPES: &[&str] = &[
    "CreateRelation",
    "DropRelation",
    "CreateRule",
    "DropRule",
    "ReplaceRule",
    "CreateIndex",
    "DropIndex",
    "RunDatalog",
];

/// Deserializes one operation from its tagged JSON form.
///
/// # Errors
///
/// Returns [`MigrateError::UnknownOperationType`] for an unrecognized
/// `type` tag, and a serialization error when the known-typed document
/// is malformed.
pub fn operation_from_value(value: &serde_json::Value) -> Result<Operation> {
    let tag = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| MigrateError::UnknownOperationType(String::from("<missing>")))?;

    if !KNOWN_OPERATION_TYPES.contains(&tag) {
        return Err(MigrateError::UnknownOperationType(tag.to_string()));
    }

    Ok(serde_json::from_value(value.clone())?)
}
