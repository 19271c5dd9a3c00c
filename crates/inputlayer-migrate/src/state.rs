//! Model state: a serializable snapshot of all relations, rules, and
//! indexes at a point in time.
//!
//! States are diffed by the autodetector and embedded in migration files
//! so later runs can reconstruct the schema without importing models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use inputlayer_core::compile::{compile_rule, RuleClause};
use inputlayer_core::index::HnswIndex;
use inputlayer_core::relation::{Relation, RelationSchema};

use crate::error::Result;

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

/// Snapshot of one index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexState {
    /// Indexed relation.
    pub relation: String,
    /// Indexed column.
    pub column: String,
    /// Distance metric.
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Graph connectivity parameter.
    #[serde(default = "default_m")]
    pub m: u32,
    /// Construction-time search width.
    #[serde(default = "default_ef_construction")]
    pub ef_construction: u32,
    /// Query-time search width.
    #[serde(default = "default_ef_search")]
    pub ef_search: u32,
}

impl From<&HnswIndex> for IndexState {
    fn from(idx: &HnswIndex) -> Self {
        Self {
            relation: idx.relation.clone(),
            column: idx.column.clone(),
            metric: idx.metric.to_string(),
            m: idx.m,
            ef_construction: idx.ef_construction,
            ef_search: idx.ef_search,
        }
    }
}

/// Snapshot of all relations, rules, and indexes at a point in time.
///
/// Maps are ordered by name, which makes serialization and autodetection
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModelState {
    /// Relation name to its ordered `(column, storage type)` list.
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<(String, String)>>,
    /// Rule name to its compiled clause texts.
    #[serde(default)]
    pub rules: BTreeMap<String, Vec<String>>,
    /// Index name to its definition.
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexState>,
}

impl ModelState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from a registered model set, compiling every
    /// derived relation's rule clauses to their persistent text.
    ///
    /// # Errors
    ///
    /// Propagates rule-compilation failures.
    pub fn from_models(models: &ModelSet) -> Result<Self> {
        let mut state = Self::new();

        for schema in &models.relations {
            state
                .relations
                .insert(schema.name.clone(), columns_as_strings(schema));
        }

        for derived in &models.derived {
            let schema = &derived.schema;
            state
                .relations
                .insert(schema.name.clone(), columns_as_strings(schema));

            let head_columns = schema.column_names();
            let mut compiled = Vec::with_capacity(derived.clauses.len());
            for clause in &derived.clauses {
                compiled.push(compile_rule(&schema.name, &head_columns, clause, true)?);
            }
            state.rules.insert(schema.name.clone(), compiled);
        }

        for idx in &models.indexes {
            state.indexes.insert(idx.name.clone(), IndexState::from(idx));
        }

        Ok(state)
    }

    /// True when no relations, rules, or indexes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty() && self.rules.is_empty() && self.indexes.is_empty()
    }
}

fn columns_as_strings(schema: &RelationSchema) -> Vec<(String, String)> {
    schema
        .columns
        .iter()
        .map(|(col, tp)| (col.clone(), tp.to_string()))
        .collect()
}

/// A derived relation's schema together with its rule clauses.
#[derive(Debug, Clone)]
pub struct DerivedModel {
    /// The derived relation's schema.
    pub schema: RelationSchema,
    /// Its defining clauses.
    pub clauses: Vec<RuleClause>,
}

/// The models an application registers for migration detection: plain
/// relations, derived relations, and index definitions.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    relations: Vec<RelationSchema>,
    derived: Vec<DerivedModel>,
    indexes: Vec<HnswIndex>,
}

impl ModelSet {
    /// Creates an empty model set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plain relation.
    #[must_use]
    pub fn relation<R: Relation>(mut self) -> Self {
        self.relations.push(R::schema());
        self
    }

    /// Registers a derived relation and its rules.
    #[must_use]
    pub fn derived<D: inputlayer_core::compile::Derived>(mut self) -> Self {
        self.derived.push(DerivedModel {
            schema: D::schema(),
            clauses: D::rules(),
        });
        self
    }

    /// Registers an index definition.
    #[must_use]
    pub fn index(mut self, idx: HnswIndex) -> Self {
        self.indexes.push(idx);
        self
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty() && self.derived.is_empty() && self.indexes.is_empty()
    }
}
