//! The typed relation model: the `Relation` trait implemented by
//! `#[derive(Relation)]`, runtime schema metadata, and aliased references
//! for self-joins.

use crate::column::Column;
use crate::types::{StorageType, Value};

/// A typed relation with a compile-time declared schema.
///
/// Implemented via `#[derive(Relation)]` on a struct with named fields;
/// the field declaration order is the positional arity order of the
/// Datalog atom.
pub trait Relation {
    /// The snake_case relation name.
    fn relation_name() -> &'static str
    where
        Self: Sized;

    /// Declaration-ordered `(column, storage type)` pairs.
    fn columns() -> Vec<(&'static str, StorageType)>
    where
        Self: Sized;

    /// The values of this instance, in column order.
    fn values(&self) -> Vec<Value>;

    /// Runtime schema metadata for this relation.
    #[must_use]
    fn schema() -> RelationSchema
    where
        Self: Sized,
    {
        RelationSchema {
            name: Self::relation_name().to_string(),
            columns: Self::columns()
                .into_iter()
                .map(|(c, t)| (c.to_string(), t))
                .collect(),
        }
    }

    /// Creates `n` independent aliased references for self-joins.
    ///
    /// ```ignore
    /// let [r1, r2] = &Follow::refs(2)[..] else { unreachable!() };
    /// ```
    #[must_use]
    fn refs(n: usize) -> Vec<RelationRef>
    where
        Self: Sized,
    {
        let schema = Self::schema();
        (1..=n)
            .map(|i| RelationRef {
                alias: Some(format!("{}_{i}", schema.name)),
                schema: schema.clone(),
            })
            .collect()
    }
}

/// Runtime metadata for a relation: its name and ordered column list.
///
/// Two schemas compare equal when both the name and the ordered column
/// list match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSchema {
    /// Relation name.
    pub name: String,
    /// Declaration-ordered `(column, storage type)` pairs.
    pub columns: Vec<(String, StorageType)>,
}

impl RelationSchema {
    /// Creates schema metadata from parts.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<(String, StorageType)>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Ordered column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Returns a column proxy for query building.
    #[must_use]
    pub fn col(&self, name: &str) -> Column {
        Column::new(self.clone(), name, None)
    }
}

/// An independent, aliased reference to a relation, used to join a
/// relation against itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRef {
    /// The referenced relation's schema.
    pub schema: RelationSchema,
    /// Alias distinguishing this reference; `None` for the plain
    /// (unaliased) occurrence.
    pub alias: Option<String>,
}

impl RelationRef {
    /// The alias when present, otherwise the relation name.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.schema.name)
    }

    /// Returns a column proxy scoped to this reference.
    #[must_use]
    pub fn col(&self, name: &str) -> Column {
        Column::new(self.schema.clone(), name, self.alias.clone())
    }
}

impl From<RelationSchema> for RelationRef {
    fn from(schema: RelationSchema) -> Self {
        Self {
            schema,
            alias: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_schema() -> RelationSchema {
        RelationSchema::new(
            "edge",
            vec![
                ("src".to_string(), StorageType::Int),
                ("dst".to_string(), StorageType::Int),
            ],
        )
    }

    #[test]
    fn test_schema_equality_is_structural() {
        assert_eq!(edge_schema(), edge_schema());
        let mut other = edge_schema();
        other.columns.reverse();
        assert_ne!(edge_schema(), other);
    }

    #[test]
    fn test_column_names_keep_order() {
        assert_eq!(edge_schema().column_names(), vec!["src", "dst"]);
    }

    #[test]
    fn test_ref_scope() {
        let plain = RelationRef::from(edge_schema());
        assert_eq!(plain.scope(), "edge");

        let aliased = RelationRef {
            schema: edge_schema(),
            alias: Some("edge_2".to_string()),
        };
        assert_eq!(aliased.scope(), "edge_2");
    }
}
