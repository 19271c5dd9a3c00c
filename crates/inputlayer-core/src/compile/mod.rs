//! Compilation of objects and AST nodes to Datalog text.
//!
//! Every function here is pure: it takes values and AST nodes and returns
//! Datalog strings, with the per-call [`VarEnv`] as the only mutable
//! state. Nothing performs I/O.

mod query;
mod rule;

pub use query::{Compiled, Query, SelectItem};
pub use rule::{compile_rule, ClauseBuilder, Derived, RuleClause};

use crate::ast::{AggExpr, CmpOp, ColumnRef, Cond, Expr};
use crate::env::VarEnv;
use crate::error::{CompileError, Result};
use crate::relation::{Relation, RelationSchema};
use crate::types::Value;

/// Compiles a value to its Datalog literal form.
#[must_use]
pub fn compile_value(value: &Value) -> String {
    value.encode()
}

/// Compiles a relation schema to its declaration statement.
///
/// `+employee(id: int, name: string, salary: float)`
#[must_use]
pub fn compile_schema(schema: &RelationSchema) -> String {
    let parts: Vec<String> = schema
        .columns
        .iter()
        .map(|(col, tp)| format!("{col}: {tp}"))
        .collect();
    format!("+{}({})", schema.name, parts.join(", "))
}

/// Compiles a single fact to an insert statement.
///
/// Persistent facts get a leading `+`; session facts omit it.
#[must_use]
pub fn compile_insert<R: Relation>(fact: &R, persistent: bool) -> String {
    let values: Vec<String> = fact.values().iter().map(Value::encode).collect();
    let prefix = if persistent { "+" } else { "" };
    format!("{prefix}{}({})", R::relation_name(), values.join(", "))
}

/// Compiles facts to a bulk insert statement.
///
/// A single fact still renders in bulk form: `+edge[(1, 2)]`.
#[must_use]
pub fn compile_bulk_insert<R: Relation>(facts: &[R], persistent: bool) -> String {
    let tuples: Vec<String> = facts
        .iter()
        .map(|fact| {
            let values: Vec<String> = fact.values().iter().map(Value::encode).collect();
            format!("({})", values.join(", "))
        })
        .collect();
    let prefix = if persistent { "+" } else { "" };
    format!("{prefix}{}[{}]", R::relation_name(), tuples.join(", "))
}

/// Compiles an exact-fact deletion.
#[must_use]
pub fn compile_delete<R: Relation>(fact: &R) -> String {
    let values: Vec<String> = fact.values().iter().map(Value::encode).collect();
    format!("-{}({})", R::relation_name(), values.join(", "))
}

/// Compiles a conditional delete.
///
/// Positional variables `X0…X{k-1}` are pre-bound to the relation's
/// columns in declaration order:
///
/// `-employee(X0, X1, X2) <- employee(X0, X1, X2), X2 = "sales"`
///
/// # Errors
///
/// Returns [`CompileError::OrInSingleBranch`] when the condition contains
/// an OR node.
pub fn compile_conditional_delete(schema: &RelationSchema, condition: &Cond) -> Result<String> {
    let vars: Vec<String> = (0..schema.columns.len()).map(|i| format!("X{i}")).collect();
    let head = format!("-{}({})", schema.name, vars.join(", "));

    let mut env = VarEnv::new();
    for ((col, _), var) in schema.columns.iter().zip(&vars) {
        env.bind(&ColumnRef::new(schema.name.clone(), col.clone()), var.clone());
    }

    let body_rel = format!("{}({})", schema.name, vars.join(", "));
    let cond_parts = compile_cond(condition, &mut env)?;

    let mut body = vec![body_rel];
    body.extend(cond_parts);
    Ok(format!("{head} <- {}", body.join(", ")))
}

/// Compiles a value expression to Datalog text.
pub fn compile_expr(expr: &Expr, env: &mut VarEnv) -> String {
    match expr {
        Expr::Column(col) => env.var(col),
        Expr::Literal(v) => v.encode(),
        Expr::Arithmetic { op, left, right } => {
            let l = compile_expr(left, env);
            let r = compile_expr(right, env);
            format!("{l} {} {r}", op.as_str())
        }
        Expr::Call(call) => {
            let args: Vec<String> = call.args.iter().map(|a| compile_expr(a, env)).collect();
            format!("{}({})", call.name, args.join(", "))
        }
        Expr::Ordered { expr, descending } => {
            let var = compile_expr(expr, env);
            let suffix = if *descending { ":desc" } else { ":asc" };
            format!("{var}{suffix}")
        }
        Expr::Aggregate(agg) => compile_agg(agg, env),
    }
}

/// Compiles an aggregation to `func<params…, passthrough…, col>` form.
fn compile_agg(agg: &AggExpr, env: &mut VarEnv) -> String {
    let mut parts: Vec<String> = Vec::new();

    for p in &agg.params {
        parts.push(p.encode());
    }
    for pt in &agg.passthrough {
        parts.push(compile_expr(pt, env));
    }
    if let Some(order) = &agg.order_column {
        let var = compile_expr(order, env);
        let suffix = if agg.descending { ":desc" } else { ":asc" };
        parts.push(format!("{var}{suffix}"));
    } else if let Some(col) = &agg.column {
        parts.push(compile_expr(col, env));
    }

    format!("{}<{}>", agg.func.as_str(), parts.join(", "))
}

/// Compiles a condition to a list of body literals.
///
/// AND flattens into multiple literals; a `Column = Column` equality is a
/// join and contributes no literal, only a unification.
///
/// # Errors
///
/// Returns [`CompileError::OrInSingleBranch`] on any OR node; callers
/// must route OR conditions through [`compile_or_branches`].
pub fn compile_cond(cond: &Cond, env: &mut VarEnv) -> Result<Vec<String>> {
    match cond {
        Cond::Compare { op, left, right } => {
            Ok(compile_comparison(*op, left, right, env).into_iter().collect())
        }
        Cond::And(l, r) => {
            let mut parts = compile_cond(l, env)?;
            parts.extend(compile_cond(r, env)?);
            Ok(parts)
        }
        Cond::Or(..) => Err(CompileError::OrInSingleBranch),
        Cond::Not(inner) => {
            let parts = compile_cond(inner, env)?;
            Ok(vec![format!("!({})", parts.join(", "))])
        }
        Cond::In {
            expr,
            target,
            target_columns,
            negated,
        } => Ok(vec![compile_in(expr, target, target_columns, *negated, env)]),
        Cond::Match {
            relation,
            relation_columns,
            bindings,
            negated,
        } => Ok(vec![compile_match(
            relation,
            relation_columns,
            bindings,
            *negated,
            env,
        )]),
    }
}

/// Compiles one comparison. Returns `None` for join unifications, which
/// are expressed through the shared variable rather than a literal.
fn compile_comparison(op: CmpOp, left: &Expr, right: &Expr, env: &mut VarEnv) -> Option<String> {
    if op == CmpOp::Eq {
        if let (Expr::Column(a), Expr::Column(b)) = (left, right) {
            env.unify(a, b);
            return None;
        }
    }
    let l = compile_expr(left, env);
    let r = compile_expr(right, env);
    Some(format!("{l} {} {r}", op.as_str()))
}

/// Compiles a membership test into a positional body atom for the target
/// relation, with the unified variable in the target column's position
/// and `_` elsewhere.
fn compile_in(
    expr: &Expr,
    target: &ColumnRef,
    target_columns: &[String],
    negated: bool,
    env: &mut VarEnv,
) -> String {
    let bound = if let Expr::Column(source) = expr {
        env.unify(source, target)
    } else {
        // A computed source cannot unify; compare against a fresh target
        // variable via the atom position.
        let _ = compile_expr(expr, env);
        env.var(target)
    };

    let positions: Vec<String> = target_columns
        .iter()
        .map(|col| {
            if *col == target.column {
                bound.clone()
            } else {
                String::from("_")
            }
        })
        .collect();

    let prefix = if negated { "!" } else { "" };
    format!("{prefix}{}({})", target.relation, positions.join(", "))
}

/// Compiles a multi-column existence check into a positional body atom.
fn compile_match(
    relation: &str,
    relation_columns: &[String],
    bindings: &[(String, Expr)],
    negated: bool,
    env: &mut VarEnv,
) -> String {
    let positions: Vec<String> = relation_columns
        .iter()
        .map(|col| {
            bindings
                .iter()
                .find(|(target, _)| target == col)
                .map_or_else(|| String::from("_"), |(_, src)| compile_expr(src, env))
        })
        .collect();

    let prefix = if negated { "!" } else { "" };
    format!("{prefix}{relation}({})", positions.join(", "))
}

/// Splits an OR condition into branches, each compiled against the shared
/// environment. OR of OR flattens into one branch list.
///
/// # Errors
///
/// Propagates compilation errors from the individual branches.
pub fn compile_or_branches(cond: &Cond, env: &mut VarEnv) -> Result<Vec<Vec<String>>> {
    match cond {
        Cond::Or(l, r) => {
            let mut branches = compile_or_branches(l, env)?;
            branches.extend(compile_or_branches(r, env)?);
            Ok(branches)
        }
        other => Ok(vec![compile_cond(other, env)?]),
    }
}

/// Walks a join condition and commits every `Column = Column` equality as
/// a unification. Emits no text.
pub fn process_join_condition(cond: &Cond, env: &mut VarEnv) {
    match cond {
        Cond::Compare {
            op: CmpOp::Eq,
            left: Expr::Column(a),
            right: Expr::Column(b),
        } => {
            env.unify(a, b);
        }
        Cond::And(l, r) => {
            process_join_condition(l, env);
            process_join_condition(r, env);
        }
        _ => {}
    }
}

/// Renders the positional body atom for one relation occurrence: bound
/// columns resolve through the environment, unbound ones are anonymous.
pub(crate) fn body_atom(
    name: &str,
    columns: &[String],
    alias: Option<&str>,
    env: &mut VarEnv,
) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|col| {
            let col_ref = ColumnRef {
                relation: name.to_string(),
                column: col.clone(),
                alias: alias.map(ToString::to_string),
            };
            env.lookup(&col_ref).unwrap_or_else(|| String::from("_"))
        })
        .collect();
    format!("{name}({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{lit, ArithOp};
    use crate::types::StorageType;

    fn employee() -> RelationSchema {
        RelationSchema::new(
            "employee",
            vec![
                ("id".to_string(), StorageType::Int),
                ("name".to_string(), StorageType::String),
                ("department".to_string(), StorageType::String),
                ("salary".to_string(), StorageType::Float),
                ("active".to_string(), StorageType::Bool),
            ],
        )
    }

    fn col(rel: &str, name: &str) -> Expr {
        Expr::Column(ColumnRef::new(rel, name))
    }

    #[test]
    fn test_compile_schema() {
        assert_eq!(
            compile_schema(&employee()),
            "+employee(id: int, name: string, department: string, salary: float, active: bool)"
        );
    }

    #[test]
    fn test_compile_schema_vector() {
        let doc = RelationSchema::new(
            "document",
            vec![
                ("id".to_string(), StorageType::Int),
                ("title".to_string(), StorageType::String),
                ("embedding".to_string(), StorageType::Vector(Some(128))),
            ],
        );
        assert_eq!(
            compile_schema(&doc),
            "+document(id: int, title: string, embedding: vector[128])"
        );
    }

    #[test]
    fn test_compile_expr_column() {
        let mut env = VarEnv::new();
        assert_eq!(compile_expr(&col("employee", "name"), &mut env), "Name");
    }

    #[test]
    fn test_compile_expr_arithmetic() {
        let mut env = VarEnv::new();
        let expr = Expr::Arithmetic {
            op: ArithOp::Add,
            left: Box::new(col("employee", "salary")),
            right: Box::new(lit(1000_i64)),
        };
        assert_eq!(compile_expr(&expr, &mut env), "Salary + 1000");
    }

    #[test]
    fn test_compile_expr_call() {
        let mut env = VarEnv::new();
        let expr = Expr::call("upper", vec![col("employee", "name")]);
        assert_eq!(compile_expr(&expr, &mut env), "upper(Name)");

        let expr = Expr::call("cosine", vec![col("d", "v1"), col("d", "v2")]);
        assert_eq!(compile_expr(&expr, &mut env), "cosine(V1, V2)");
    }

    #[test]
    fn test_compile_expr_ordered() {
        let mut env = VarEnv::new();
        assert_eq!(
            compile_expr(&col("e", "salary").desc(), &mut env),
            "Salary:desc"
        );
        assert_eq!(
            compile_expr(&col("e", "salary").asc(), &mut env),
            "Salary:asc"
        );
    }

    #[test]
    fn test_compile_cond_comparison() {
        let mut env = VarEnv::new();
        let cond = Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "department"),
            right: lit("eng"),
        };
        assert_eq!(
            compile_cond(&cond, &mut env).unwrap(),
            vec!["Department = \"eng\""]
        );
    }

    #[test]
    fn test_compile_cond_join_produces_no_literal() {
        let mut env = VarEnv::new();
        let cond = Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "department"),
            right: col("department", "name"),
        };
        assert!(compile_cond(&cond, &mut env).unwrap().is_empty());
        // Both sides resolve to the same variable afterwards.
        let a = env.var(&ColumnRef::new("employee", "department"));
        let b = env.var(&ColumnRef::new("department", "name"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_compile_cond_and_flattens() {
        let mut env = VarEnv::new();
        let cond = Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "department"),
            right: lit("eng"),
        }
        .and(Cond::Compare {
            op: CmpOp::Lt,
            left: col("employee", "salary"),
            right: lit(50_000_i64),
        });
        assert_eq!(
            compile_cond(&cond, &mut env).unwrap(),
            vec!["Department = \"eng\"", "Salary < 50000"]
        );
    }

    #[test]
    fn test_compile_cond_rejects_or() {
        let mut env = VarEnv::new();
        let cmp = Cond::Compare {
            op: CmpOp::Eq,
            left: col("e", "a"),
            right: lit(1_i64),
        };
        let result = compile_cond(&cmp.clone().or(cmp), &mut env);
        assert!(matches!(result, Err(CompileError::OrInSingleBranch)));
    }

    #[test]
    fn test_compile_cond_not() {
        let mut env = VarEnv::new();
        let cond = Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "active"),
            right: lit(false),
        }
        .negate();
        assert_eq!(
            compile_cond(&cond, &mut env).unwrap(),
            vec!["!(Active = false)"]
        );
    }

    #[test]
    fn test_compile_in_emits_positional_atom() {
        let mut env = VarEnv::new();
        let cond = Cond::In {
            expr: col("employee", "department"),
            target: ColumnRef::new("department", "name"),
            target_columns: vec!["name".to_string(), "budget".to_string()],
            negated: false,
        };
        let parts = compile_cond(&cond, &mut env).unwrap();
        assert_eq!(parts, vec!["department(Department, _)"]);
    }

    #[test]
    fn test_compile_negated_in() {
        let mut env = VarEnv::new();
        let cond = Cond::In {
            expr: col("employee", "id"),
            target: ColumnRef::new("blocked", "employee_id"),
            target_columns: vec!["employee_id".to_string(), "reason".to_string()],
            negated: true,
        };
        let parts = compile_cond(&cond, &mut env).unwrap();
        assert_eq!(parts, vec!["!blocked(Id, _)"]);
    }

    #[test]
    fn test_compile_match_places_bindings() {
        let mut env = VarEnv::new();
        let cond = Cond::Match {
            relation: "permission".to_string(),
            relation_columns: vec![
                "user_id".to_string(),
                "resource".to_string(),
                "level".to_string(),
            ],
            bindings: vec![
                ("user_id".to_string(), col("request", "user_id")),
                ("resource".to_string(), col("request", "resource")),
            ],
            negated: true,
        };
        let parts = compile_cond(&cond, &mut env).unwrap();
        assert_eq!(parts, vec!["!permission(UserId, Resource, _)"]);
    }

    #[test]
    fn test_or_branches_flatten() {
        let mut env = VarEnv::new();
        let eq = |v: &str| Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "department"),
            right: lit(v),
        };
        let cond = eq("eng").or(eq("sales")).or(eq("hr"));
        let branches = compile_or_branches(&cond, &mut env).unwrap();
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0], vec!["Department = \"eng\""]);
        assert_eq!(branches[2], vec!["Department = \"hr\""]);
    }

    #[test]
    fn test_conditional_delete() {
        let cond = Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "department"),
            right: lit("sales"),
        };
        let text = compile_conditional_delete(&employee(), &cond).unwrap();
        assert!(text.starts_with(
            "-employee(X0, X1, X2, X3, X4) <- employee(X0, X1, X2, X3, X4)"
        ));
        assert!(text.contains("X2 = \"sales\""));
    }

    #[test]
    fn test_conditional_delete_compound() {
        let cond = Cond::Compare {
            op: CmpOp::Eq,
            left: col("employee", "department"),
            right: lit("sales"),
        }
        .and(Cond::Compare {
            op: CmpOp::Lt,
            left: col("employee", "salary"),
            right: lit(50_000_i64),
        });
        let text = compile_conditional_delete(&employee(), &cond).unwrap();
        assert!(text.contains("X2 = \"sales\""));
        assert!(text.contains("X3 < 50000"));
    }

    #[test]
    fn test_body_atom_anonymous_positions() {
        let mut env = VarEnv::new();
        env.var(&ColumnRef::new("employee", "name"));
        let atom = body_atom(
            "employee",
            &[
                "id".to_string(),
                "name".to_string(),
                "department".to_string(),
            ],
            None,
            &mut env,
        );
        assert_eq!(atom, "employee(_, Name, _)");
    }

    #[test]
    fn test_agg_count() {
        let mut env = VarEnv::new();
        let agg = AggExpr {
            func: crate::ast::AggFunc::Count,
            column: Some(Box::new(col("employee", "id"))),
            params: vec![],
            passthrough: vec![],
            order_column: None,
            descending: true,
        };
        assert_eq!(compile_agg(&agg, &mut env), "count<Id>");
    }

    #[test]
    fn test_agg_top_k_shape() {
        let mut env = VarEnv::new();
        let agg = AggExpr {
            func: crate::ast::AggFunc::TopK,
            column: None,
            params: vec![Value::Int(5)],
            passthrough: vec![col("doc", "id")],
            order_column: Some(Box::new(col("doc", "score"))),
            descending: true,
        };
        assert_eq!(compile_agg(&agg, &mut env), "top_k<5, Id, Score:desc>");
    }
}
