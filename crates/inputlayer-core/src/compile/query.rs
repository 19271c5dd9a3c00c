//! Query builder and compilation.
//!
//! A [`Query`] collects selections, joined relations, conditions, and
//! modifiers, then lowers to `?head <- body` text. A filter containing OR
//! fans out into one query per OR branch; the caller unions the row sets.

use crate::ast::{AggExpr, Cond, Expr};
use crate::column::Column;
use crate::env::VarEnv;
use crate::error::{CompileError, Result};
use crate::relation::{Relation, RelationRef};

use super::{
    body_atom, compile_cond, compile_expr, compile_or_branches, process_join_condition,
};

/// One item of a query's selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// A full relation: expands to every column in declaration order.
    Relation(RelationRef),
    /// A single column.
    Column(Column),
    /// An aggregation; switches the query into grouped-head mode.
    Aggregate(AggExpr),
}

/// A compiled query: a single program, or one program per OR branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    /// One query string.
    Single(String),
    /// One query per OR branch; the caller unions (and may deduplicate)
    /// the branch results.
    Union(Vec<String>),
}

impl Compiled {
    /// The compiled programs, OR-split or not.
    #[must_use]
    pub fn programs(&self) -> Vec<&str> {
        match self {
            Self::Single(q) => vec![q.as_str()],
            Self::Union(qs) => qs.iter().map(String::as_str).collect(),
        }
    }
}

/// Builder for Datalog queries.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Query {
    select: Vec<SelectItem>,
    relations: Vec<RelationRef>,
    on: Option<Cond>,
    filter: Option<Cond>,
    order_by: Option<Expr>,
    limit: Option<u64>,
    offset: Option<u64>,
    computed: Vec<(String, Expr)>,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every column of a relation.
    pub fn select_relation<R: Relation>(mut self) -> Self {
        self.select
            .push(SelectItem::Relation(RelationRef::from(R::schema())));
        self
    }

    /// Selects every column of an aliased relation reference.
    pub fn select_ref(mut self, r: &RelationRef) -> Self {
        self.select.push(SelectItem::Relation(r.clone()));
        self
    }

    /// Selects a single column.
    pub fn select(mut self, col: Column) -> Self {
        self.select.push(SelectItem::Column(col));
        self
    }

    /// Selects an aggregation.
    pub fn select_agg(mut self, agg: AggExpr) -> Self {
        self.select.push(SelectItem::Aggregate(agg));
        self
    }

    /// Adds a relation to the query body.
    pub fn from_relation<R: Relation>(mut self) -> Self {
        self.relations.push(RelationRef::from(R::schema()));
        self
    }

    /// Adds an aliased relation reference to the query body.
    pub fn from_ref(mut self, r: RelationRef) -> Self {
        self.relations.push(r);
        self
    }

    /// Sets the join condition. `Column = Column` equalities unify
    /// variables and emit no literals.
    pub fn on(mut self, cond: Cond) -> Self {
        self.on = Some(match self.on.take() {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Adds a filter condition; repeated calls AND together.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Orders by a column; wrap with [`Column::desc`] for descending.
    pub fn order_by(mut self, expr: impl Into<Expr>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    /// Limits the result to `n` rows.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Limits the result to `n` rows starting at `offset`.
    pub fn limit_offset(mut self, n: u64, offset: u64) -> Self {
        self.limit = Some(n);
        self.offset = Some(offset);
        self
    }

    /// Adds a computed head column.
    pub fn compute(mut self, alias: impl Into<String>, expr: impl Into<Expr>) -> Self {
        self.computed.push((alias.into(), expr.into()));
        self
    }

    /// Compiles the query.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::OrInSingleBranch`] when an aggregated
    /// query carries an OR filter (grouped heads cannot fan out), and
    /// propagates condition-compilation failures.
    pub fn compile(&self) -> Result<Compiled> {
        let mut env = VarEnv::new();
        let mut all_relations = self.relations.clone();

        // Joins commit unifications before any variable is emitted.
        if let Some(on) = &self.on {
            process_join_condition(on, &mut env);
        }

        let has_agg = self
            .select
            .iter()
            .any(|s| matches!(s, SelectItem::Aggregate(_)))
            || self
                .computed
                .iter()
                .any(|(_, e)| matches!(e, Expr::Aggregate(_)));

        // Filter: OR fans out, anything else compiles flat.
        let mut where_parts: Vec<String> = Vec::new();
        let mut or_branches: Option<Vec<Vec<String>>> = None;
        if let Some(filter) = &self.filter {
            if filter.has_or() {
                if has_agg {
                    return Err(CompileError::OrInSingleBranch);
                }
                or_branches = Some(compile_or_branches(filter, &mut env)?);
            } else {
                where_parts = compile_cond(filter, &mut env)?;
            }
        }

        if has_agg {
            return self
                .compile_grouped(&mut env, &mut all_relations, &where_parts)
                .map(Compiled::Single);
        }

        let mut head_parts: Vec<String> = Vec::new();

        // Full relations expand to all columns and imply their body atom.
        for item in &self.select {
            if let SelectItem::Relation(r) = item {
                for col in r.schema.column_names() {
                    head_parts.push(env.var(&r.col(&col).column_ref()));
                }
                add_relation(&mut all_relations, r);
            }
        }

        // Individual columns; their owners are implied body relations.
        for item in &self.select {
            if let SelectItem::Column(c) = item {
                head_parts.push(env.var(&c.column_ref()));
                add_relation(
                    &mut all_relations,
                    &RelationRef {
                        schema: c.owner().clone(),
                        alias: c.column_ref().alias,
                    },
                );
            }
        }

        for (_, expr) in &self.computed {
            head_parts.push(compile_expr(expr, &mut env));
        }

        self.apply_order(&mut head_parts, &mut env);

        let body_atoms: Vec<String> = all_relations
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

        let head = head_parts.join(", ");

        if let Some(branches) = or_branches {
            let queries = branches
                .into_iter()
                .map(|branch| {
                    let mut body = body_atoms.clone();
                    body.extend(branch);
                    self.push_limit(&mut body);
                    format!("?{head} <- {}", body.join(", "))
                })
                .collect();
            return Ok(Compiled::Union(queries));
        }

        let mut body = body_atoms;
        body.extend(where_parts);
        self.push_limit(&mut body);

        if body.is_empty() {
            Ok(Compiled::Single(format!("?{head}")))
        } else {
            Ok(Compiled::Single(format!("?{head} <- {}", body.join(", "))))
        }
    }

    /// Grouped-head compilation: non-aggregate selections become group-by
    /// keys, aggregations fill the aggregated head positions.
    fn compile_grouped(
        &self,
        env: &mut VarEnv,
        all_relations: &mut Vec<RelationRef>,
        where_parts: &[String],
    ) -> Result<String> {
        let mut head_parts: Vec<String> = Vec::new();
        let mut agg_parts: Vec<String> = Vec::new();

        for item in &self.select {
            match item {
                SelectItem::Aggregate(agg) => {
                    agg_parts.push(compile_expr(&Expr::Aggregate(agg.clone()), env));
                }
                SelectItem::Column(c) => {
                    head_parts.push(env.var(&c.column_ref()));
                    add_relation(
                        all_relations,
                        &RelationRef {
                            schema: c.owner().clone(),
                            alias: c.column_ref().alias,
                        },
                    );
                }
                SelectItem::Relation(r) => {
                    for col in r.schema.column_names() {
                        head_parts.push(env.var(&r.col(&col).column_ref()));
                    }
                    add_relation(all_relations, r);
                }
            }
        }

        for (_, expr) in &self.computed {
            if matches!(expr, Expr::Aggregate(_)) {
                agg_parts.push(compile_expr(expr, env));
            } else {
                head_parts.push(compile_expr(expr, env));
            }
        }

        let body_atoms: Vec<String> = all_relations
            .iter()
            .map(|r| {
                body_atom(
                    &r.schema.name,
                    &r.schema.column_names(),
                    r.alias.as_deref(),
                    env,
                )
            })
            .collect();

        let mut body = body_atoms;
        body.extend(where_parts.iter().cloned());
        self.push_limit(&mut body);

        head_parts.extend(agg_parts);
        let head = head_parts.join(", ");

        if body.is_empty() {
            Ok(format!("?{head}"))
        } else {
            Ok(format!("?{head} <- {}", body.join(", ")))
        }
    }

    /// Decorates the ordering variable in the head with `:asc`/`:desc`
    /// when a head position matches it by name.
    fn apply_order(&self, head_parts: &mut [String], env: &mut VarEnv) {
        let Some(order) = &self.order_by else {
            return;
        };
        let (order_var, suffix) = match order {
            Expr::Ordered { expr, descending } => (
                compile_expr(expr, env),
                if *descending { ":desc" } else { ":asc" },
            ),
            other => (compile_expr(other, env), ":asc"),
        };
        if let Some(slot) = head_parts.iter_mut().find(|hp| **hp == order_var) {
            *slot = format!("{order_var}{suffix}");
        }
    }

    fn push_limit(&self, body: &mut Vec<String>) {
        if let Some(limit) = self.limit {
            match self.offset {
                Some(offset) => body.push(format!("limit({limit}, {offset})")),
                None => body.push(format!("limit({limit})")),
            }
        }
    }
}

/// Adds a relation occurrence unless the same (name, alias) pair is
/// already present.
fn add_relation(relations: &mut Vec<RelationRef>, r: &RelationRef) {
    let present = relations
        .iter()
        .any(|existing| existing.schema.name == r.schema.name && existing.alias == r.alias);
    if !present {
        relations.push(r.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::{count, top_k};
    use crate::ast::lit;
    use crate::relation::RelationSchema;
    use crate::types::StorageType;

    struct Employee;

    impl Relation for Employee {
        fn relation_name() -> &'static str {
            "employee"
        }

        fn columns() -> Vec<(&'static str, StorageType)> {
            vec![
                ("id", StorageType::Int),
                ("name", StorageType::String),
                ("department", StorageType::String),
                ("salary", StorageType::Float),
                ("active", StorageType::Bool),
            ]
        }

        fn values(&self) -> Vec<crate::types::Value> {
            vec![]
        }
    }

    struct Department;

    impl Relation for Department {
        fn relation_name() -> &'static str {
            "department"
        }

        fn columns() -> Vec<(&'static str, StorageType)> {
            vec![
                ("name", StorageType::String),
                ("budget", StorageType::Float),
            ]
        }

        fn values(&self) -> Vec<crate::types::Value> {
            vec![]
        }
    }

    fn employee() -> RelationSchema {
        Employee::schema()
    }

    fn single(compiled: Compiled) -> String {
        match compiled {
            Compiled::Single(q) => q,
            Compiled::Union(qs) => panic!("expected single query, got {qs:?}"),
        }
    }

    #[test]
    fn test_select_full_relation() {
        let q = Query::new().select_relation::<Employee>().compile().unwrap();
        assert_eq!(
            single(q),
            "?Id, Name, Department, Salary, Active <- employee(Id, Name, Department, Salary, Active)"
        );
    }

    #[test]
    fn test_select_columns_derives_relation() {
        let q = Query::new()
            .select(employee().col("name"))
            .select(employee().col("salary"))
            .compile()
            .unwrap();
        assert_eq!(single(q), "?Name, Salary <- employee(_, Name, _, Salary, _)");
    }

    #[test]
    fn test_filter() {
        let q = Query::new()
            .select_relation::<Employee>()
            .filter(employee().col("department").eq(lit("eng")))
            .compile()
            .unwrap();
        let text = single(q);
        assert!(text.contains("employee(Id, Name, Department, Salary, Active)"));
        assert!(text.contains("Department = \"eng\""));
    }

    #[test]
    fn test_limit_and_offset() {
        let q = Query::new()
            .select_relation::<Employee>()
            .limit(10)
            .compile()
            .unwrap();
        assert!(single(q).contains("limit(10)"));

        let q = Query::new()
            .select_relation::<Employee>()
            .limit_offset(10, 20)
            .compile()
            .unwrap();
        assert!(single(q).contains("limit(10, 20)"));
    }

    #[test]
    fn test_limit_zero_is_valid() {
        let q = Query::new()
            .select_relation::<Employee>()
            .limit(0)
            .compile()
            .unwrap();
        assert!(single(q).contains("limit(0)"));

        let q = Query::new()
            .select_relation::<Employee>()
            .limit_offset(0, 0)
            .compile()
            .unwrap();
        assert!(single(q).contains("limit(0, 0)"));
    }

    #[test]
    fn test_order_by_desc() {
        let q = Query::new()
            .select_relation::<Employee>()
            .order_by(employee().col("salary").desc())
            .compile()
            .unwrap();
        assert!(single(q).contains("Salary:desc"));
    }

    #[test]
    fn test_order_by_plain_column_is_ascending() {
        let q = Query::new()
            .select_relation::<Employee>()
            .order_by(employee().col("salary"))
            .compile()
            .unwrap();
        assert!(single(q).contains("Salary:asc"));
    }

    #[test]
    fn test_join_unifies_variables() {
        let q = Query::new()
            .select(employee().col("name"))
            .select(Department::schema().col("budget"))
            .from_relation::<Employee>()
            .from_relation::<Department>()
            .on(employee()
                .col("department")
                .eq(Department::schema().col("name")))
            .compile()
            .unwrap();
        let text = single(q);
        assert!(text.contains("employee("));
        assert!(text.contains("department("));
        // The join variable appears in both atoms.
        assert!(text.contains("department(Department, Budget)"));
    }

    #[test]
    fn test_or_splits_into_union() {
        let q = Query::new()
            .select_relation::<Employee>()
            .filter(
                employee()
                    .col("department")
                    .eq(lit("eng"))
                    .or(employee().col("department").eq(lit("sales"))),
            )
            .compile()
            .unwrap();
        match q {
            Compiled::Union(queries) => {
                assert_eq!(queries.len(), 2);
                assert!(queries[0].contains("Department = \"eng\""));
                assert!(queries[1].contains("Department = \"sales\""));
                // Same head on both branches.
                let head = |s: &str| s.split(" <- ").next().unwrap().to_string();
                assert_eq!(head(&queries[0]), head(&queries[1]));
            }
            Compiled::Single(q) => panic!("expected union, got {q}"),
        }
    }

    #[test]
    fn test_nested_or_flattens() {
        let eq = |v: &str| employee().col("department").eq(lit(v));
        let q = Query::new()
            .select_relation::<Employee>()
            .filter(eq("eng").or(eq("sales")).or(eq("hr")))
            .compile()
            .unwrap();
        match q {
            Compiled::Union(queries) => assert_eq!(queries.len(), 3),
            Compiled::Single(q) => panic!("expected union, got {q}"),
        }
    }

    #[test]
    fn test_negation() {
        let q = Query::new()
            .select_relation::<Employee>()
            .filter(employee().col("active").eq(lit(false)).negate())
            .compile()
            .unwrap();
        assert!(single(q).contains("!(Active = false)"));
    }

    #[test]
    fn test_computed_column() {
        let q = Query::new()
            .select(employee().col("name"))
            .compute("bonus", employee().col("salary").mul(lit(0.1)))
            .compile()
            .unwrap();
        assert!(single(q).contains("Salary * 0.1"));
    }

    #[test]
    fn test_aggregation_switches_to_grouped_head() {
        let q = Query::new()
            .select(employee().col("department"))
            .select_agg(count(employee().col("id")))
            .compile()
            .unwrap();
        let text = single(q);
        assert!(text.starts_with("?Department, count<Id>"));
    }

    #[test]
    fn test_aggregation_only() {
        let q = Query::new()
            .select_agg(count(employee().col("id")))
            .from_relation::<Employee>()
            .compile()
            .unwrap();
        let text = single(q);
        assert!(text.contains("count<Id>"));
        assert!(text.contains("employee("));
    }

    #[test]
    fn test_top_k_in_query() {
        let doc = RelationSchema::new(
            "doc",
            vec![
                ("id".to_string(), StorageType::Int),
                ("score".to_string(), StorageType::Float),
            ],
        );
        let q = Query::new()
            .select_agg(top_k(5, vec![doc.col("id").into()], doc.col("score")))
            .from_ref(RelationRef::from(doc))
            .compile()
            .unwrap();
        assert!(single(q).contains("top_k<5, Id, Score:desc>"));
    }

    #[test]
    fn test_aggregation_with_or_filter_is_rejected() {
        let result = Query::new()
            .select_agg(count(employee().col("id")))
            .from_relation::<Employee>()
            .filter(
                employee()
                    .col("department")
                    .eq(lit("eng"))
                    .or(employee().col("department").eq(lit("sales"))),
            )
            .compile();
        assert!(matches!(result, Err(CompileError::OrInSingleBranch)));
    }

    #[test]
    fn test_self_join_with_refs() {
        struct Follow;

        impl Relation for Follow {
            fn relation_name() -> &'static str {
                "follow"
            }

            fn columns() -> Vec<(&'static str, StorageType)> {
                vec![("follower", StorageType::Int), ("followee", StorageType::Int)]
            }

            fn values(&self) -> Vec<crate::types::Value> {
                vec![]
            }
        }

        let refs = Follow::refs(2);
        let (r1, r2) = (&refs[0], &refs[1]);
        let q = Query::new()
            .select(r1.col("follower"))
            .select(r2.col("followee"))
            .from_ref(r1.clone())
            .from_ref(r2.clone())
            .on(r1.col("followee").eq(r2.col("follower")))
            .compile()
            .unwrap();
        let text = single(q);
        // The join variable takes the left column's name; the selected
        // followee of the second ref collides and gets a suffix.
        assert!(text.starts_with("?Follower, Followee_1 <- "));
        let body = text.split(" <- ").nth(1).unwrap();
        assert!(body.contains("follow(Follower, Followee)"));
        assert!(body.contains("follow(Followee, Followee_1)"));
    }

    #[test]
    fn test_disjoint_environments_are_deterministic() {
        let build = || {
            Query::new()
                .select_relation::<Employee>()
                .filter(employee().col("salary").gt(lit(100_000_i64)))
                .compile()
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}
