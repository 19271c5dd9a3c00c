//! Rule clauses for derived relations.
//!
//! A derived relation is defined by one or more clauses; each clause maps
//! the head columns to body expressions over a set of body relations,
//! optionally filtered. Clauses compile to `head(H…) <- body` text, with
//! a leading `+` for persistent rules.

use crate::ast::{Cond, Expr};
use crate::env::VarEnv;
use crate::error::Result;
use crate::naming::column_to_variable;
use crate::relation::{Relation, RelationRef};

use super::{body_atom, compile_cond, compile_expr, process_join_condition};

/// A relation whose rows are computed by rules rather than inserted.
pub trait Derived: Relation {
    /// The clauses defining this relation, one per disjunct.
    fn rules() -> Vec<RuleClause>;
}

/// One clause of a derived relation's defining rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleClause {
    /// Body relations, in atom order.
    pub relations: Vec<RelationRef>,
    /// Head column name to body expression.
    pub select_map: Vec<(String, Expr)>,
    /// Optional filter condition.
    pub condition: Option<Cond>,
}

impl RuleClause {
    /// Starts building a clause over the given body relations.
    #[must_use]
    pub fn over(relations: impl IntoIterator<Item = RelationRef>) -> ClauseBuilder {
        ClauseBuilder {
            relations: relations.into_iter().collect(),
            condition: None,
        }
    }
}

/// Builder for [`RuleClause`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ClauseBuilder {
    relations: Vec<RelationRef>,
    condition: Option<Cond>,
}

impl ClauseBuilder {
    /// Creates a builder with no body relations yet.
    pub fn new() -> Self {
        Self {
            relations: Vec::new(),
            condition: None,
        }
    }

    /// Adds a body relation.
    pub fn relation<R: Relation>(mut self) -> Self {
        self.relations.push(RelationRef::from(R::schema()));
        self
    }

    /// Adds an aliased body relation reference.
    pub fn relation_ref(mut self, r: RelationRef) -> Self {
        self.relations.push(r);
        self
    }

    /// Adds a filter condition; repeated calls AND together.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Finishes the clause by mapping head columns to body expressions.
    #[must_use]
    pub fn select<I, N, E>(self, columns: I) -> RuleClause
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: Into<Expr>,
    {
        RuleClause {
            relations: self.relations,
            select_map: columns
                .into_iter()
                .map(|(name, expr)| (name.into(), expr.into()))
                .collect(),
            condition: self.condition,
        }
    }
}

impl Default for ClauseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles one rule clause.
///
/// `+reachable(Src, Dst) <- edge(Src, Dst)` for persistent rules; the
/// session form omits the `+`.
///
/// # Errors
///
/// Returns [`CompileError::OrInSingleBranch`](crate::error::CompileError::OrInSingleBranch)
/// when the clause condition contains an OR node; define one clause per
/// disjunct instead.
pub fn compile_rule(
    head_name: &str,
    head_columns: &[String],
    clause: &RuleClause,
    persistent: bool,
) -> Result<String> {
    let mut env = VarEnv::new();

    // Joins first, so the head sees unified variables.
    if let Some(cond) = &clause.condition {
        process_join_condition(cond, &mut env);
    }

    let head_parts: Vec<String> = head_columns
        .iter()
        .map(|col| {
            clause
                .select_map
                .iter()
                .find(|(name, _)| name == col)
                .map_or_else(
                    || column_to_variable(col),
                    |(_, expr)| compile_expr(expr, &mut env),
                )
        })
        .collect();

    let body_atoms: Vec<String> = clause
        .relations
        .iter()
        .map(|r| {
            body_atom(
                &r.schema.name,
                &r.schema.column_names(),
                r.alias.as_deref(),
                &mut env,
            )
        })
        .collect();

    let mut body = body_atoms;
    if let Some(cond) = &clause.condition {
        body.extend(compile_cond(cond, &mut env)?);
    }

    let prefix = if persistent { "+" } else { "" };
    Ok(format!(
        "{prefix}{head_name}({}) <- {}",
        head_parts.join(", "),
        body.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::lit;
    use crate::relation::RelationSchema;
    use crate::types::{StorageType, Value};

    struct Edge;

    impl Relation for Edge {
        fn relation_name() -> &'static str {
            "edge"
        }

        fn columns() -> Vec<(&'static str, StorageType)> {
            vec![("src", StorageType::Int), ("dst", StorageType::Int)]
        }

        fn values(&self) -> Vec<Value> {
            vec![]
        }
    }

    fn edge() -> RelationSchema {
        Edge::schema()
    }

    fn reachable() -> RelationSchema {
        RelationSchema::new(
            "reachable",
            vec![
                ("src".to_string(), StorageType::Int),
                ("dst".to_string(), StorageType::Int),
            ],
        )
    }

    #[test]
    fn test_base_case() {
        let clause = RuleClause::over([RelationRef::from(edge())]).select([
            ("src", edge().col("src")),
            ("dst", edge().col("dst")),
        ]);
        let text = compile_rule(
            "reachable",
            &["src".to_string(), "dst".to_string()],
            &clause,
            true,
        )
        .unwrap();
        assert_eq!(text, "+reachable(Src, Dst) <- edge(Src, Dst)");
    }

    #[test]
    fn test_session_rule_has_no_prefix() {
        let clause = RuleClause::over([RelationRef::from(edge())]).select([
            ("src", edge().col("src")),
            ("dst", edge().col("dst")),
        ]);
        let text = compile_rule(
            "reachable",
            &["src".to_string(), "dst".to_string()],
            &clause,
            false,
        )
        .unwrap();
        assert_eq!(text, "reachable(Src, Dst) <- edge(Src, Dst)");
    }

    #[test]
    fn test_recursive_step() {
        let clause = RuleClause::over([
            RelationRef::from(reachable()),
            RelationRef::from(edge()),
        ])
        .filter(reachable().col("dst").eq(edge().col("src")))
        .select([
            ("src", reachable().col("src")),
            ("dst", edge().col("dst")),
        ]);
        let text = compile_rule(
            "reachable",
            &["src".to_string(), "dst".to_string()],
            &clause,
            true,
        )
        .unwrap();
        assert!(text.starts_with("+reachable(Src,"));
        assert!(text.contains("<-"));
        assert!(text.contains("reachable("));
        assert!(text.contains("edge("));
    }

    #[test]
    fn test_filter_condition() {
        let employee = RelationSchema::new(
            "employee",
            vec![
                ("id".to_string(), StorageType::Int),
                ("name".to_string(), StorageType::String),
                ("salary".to_string(), StorageType::Float),
            ],
        );
        let clause = RuleClause::over([RelationRef::from(employee.clone())])
            .filter(employee.col("salary").gt(lit(100_000_i64)))
            .select([
                ("id", employee.col("id")),
                ("name", employee.col("name")),
            ]);
        let text = compile_rule(
            "high_earner",
            &["id".to_string(), "name".to_string()],
            &clause,
            true,
        )
        .unwrap();
        assert!(text.contains("+high_earner(Id, Name)"));
        assert!(text.contains("Salary > 100000"));
    }

    #[test]
    fn test_unmapped_head_column_gets_its_own_variable() {
        let clause = RuleClause::over([RelationRef::from(edge())])
            .select([("src", edge().col("src"))]);
        let text = compile_rule(
            "partial",
            &["src".to_string(), "weight".to_string()],
            &clause,
            true,
        )
        .unwrap();
        assert!(text.starts_with("+partial(Src, Weight) <- "));
    }

    #[test]
    fn test_builder_accumulates_filters() {
        let clause = ClauseBuilder::new()
            .relation::<Edge>()
            .filter(edge().col("src").gt(lit(0_i64)))
            .filter(edge().col("dst").gt(lit(0_i64)))
            .select([("src", edge().col("src")), ("dst", edge().col("dst"))]);
        assert!(matches!(clause.condition, Some(Cond::And(..))));
    }
}
