//! HNSW vector index definitions.

use std::fmt;

use crate::relation::Relation;

/// Distance metrics supported by HNSW indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Euclidean (L2) distance.
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
    /// Dot product.
    DotProduct,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => f.write_str("cosine"),
            Self::Euclidean => f.write_str("euclidean"),
            Self::Manhattan => f.write_str("manhattan"),
            Self::DotProduct => f.write_str("dot_product"),
        }
    }
}

/// An HNSW vector index over one relation column.
///
/// Compiles to:
///
/// ```text
/// .index create <name> on <relation>(<column>) type hnsw
///     metric <metric> m <m> ef_construction <ef_c> ef_search <ef_s>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HnswIndex {
    /// Index name.
    pub name: String,
    /// Indexed relation name.
    pub relation: String,
    /// Indexed column name.
    pub column: String,
    /// Distance metric.
    pub metric: Metric,
    /// Graph connectivity parameter.
    pub m: u32,
    /// Construction-time search width.
    pub ef_construction: u32,
    /// Query-time search width.
    pub ef_search: u32,
}

impl HnswIndex {
    /// Creates an index definition with the default parameters
    /// (cosine, m 16, ef_construction 100, ef_search 50).
    #[must_use]
    pub fn new<R: Relation>(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relation: R::relation_name().to_string(),
            column: column.into(),
            metric: Metric::Cosine,
            m: 16,
            ef_construction: 100,
            ef_search: 50,
        }
    }

    /// Sets the distance metric.
    #[must_use]
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the graph connectivity parameter.
    #[must_use]
    pub fn m(mut self, m: u32) -> Self {
        self.m = m;
        self
    }

    /// Sets the construction-time search width.
    #[must_use]
    pub fn ef_construction(mut self, ef: u32) -> Self {
        self.ef_construction = ef;
        self
    }

    /// Sets the query-time search width.
    #[must_use]
    pub fn ef_search(mut self, ef: u32) -> Self {
        self.ef_search = ef;
        self
    }

    /// Compiles this definition to its `.index create` meta command.
    #[must_use]
    pub fn to_command(&self) -> String {
        format!(
            ".index create {} on {}({}) type hnsw metric {} m {} ef_construction {} ef_search {}",
            self.name,
            self.relation,
            self.column,
            self.metric,
            self.m,
            self.ef_construction,
            self.ef_search
        )
    }
}
