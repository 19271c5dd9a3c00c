//! Aggregation constructors.
//!
//! Each function builds an [`AggExpr`] with its fixed Datalog name.
//! Selecting any aggregation switches a query into grouped-head mode:
//! the remaining selections become group-by keys.

use crate::ast::{AggExpr, AggFunc, Expr};
use crate::types::Value;

fn simple(func: AggFunc, column: impl Into<Expr>) -> AggExpr {
    AggExpr {
        func,
        column: Some(Box::new(column.into())),
        params: vec![],
        passthrough: vec![],
        order_column: None,
        descending: true,
    }
}

/// Counts rows: `count<Var>`.
#[must_use]
pub fn count(column: impl Into<Expr>) -> AggExpr {
    simple(AggFunc::Count, column)
}

/// Counts rows with no column: `count<>`. The body must still bind at
/// least one variable.
#[must_use]
pub fn count_all() -> AggExpr {
    AggExpr {
        func: AggFunc::Count,
        column: None,
        params: vec![],
        passthrough: vec![],
        order_column: None,
        descending: true,
    }
}

/// Counts distinct values: `count_distinct<Var>`.
#[must_use]
pub fn count_distinct(column: impl Into<Expr>) -> AggExpr {
    simple(AggFunc::CountDistinct, column)
}

/// Sums numeric values: `sum<Var>`.
#[must_use]
pub fn sum(column: impl Into<Expr>) -> AggExpr {
    simple(AggFunc::Sum, column)
}

/// Minimum value: `min<Var>`.
#[must_use]
pub fn min(column: impl Into<Expr>) -> AggExpr {
    simple(AggFunc::Min, column)
}

/// Maximum value: `max<Var>`.
#[must_use]
pub fn max(column: impl Into<Expr>) -> AggExpr {
    simple(AggFunc::Max, column)
}

/// Average value: `avg<Var>`.
#[must_use]
pub fn avg(column: impl Into<Expr>) -> AggExpr {
    simple(AggFunc::Avg, column)
}

/// Top-K by the order column, descending by default:
/// `top_k<k, Passthrough…, OrderCol:desc>`.
///
/// Chain [`AggExpr::ascending`] to flip the direction.
#[must_use]
pub fn top_k(k: i64, passthrough: Vec<Expr>, order_by: impl Into<Expr>) -> AggExpr {
    AggExpr {
        func: AggFunc::TopK,
        column: None,
        params: vec![Value::Int(k)],
        passthrough,
        order_column: Some(Box::new(order_by.into())),
        descending: true,
    }
}

/// Top-K with a score threshold:
/// `top_k_threshold<k, threshold, Passthrough…, OrderCol:desc>`.
#[must_use]
pub fn top_k_threshold(
    k: i64,
    threshold: f64,
    passthrough: Vec<Expr>,
    order_by: impl Into<Expr>,
) -> AggExpr {
    AggExpr {
        func: AggFunc::TopKThreshold,
        column: None,
        params: vec![Value::Int(k), Value::Float(threshold)],
        passthrough,
        order_column: Some(Box::new(order_by.into())),
        descending: true,
    }
}

/// All rows within a distance, nearest first:
/// `within_radius<r, Passthrough…, DistCol:asc>`.
///
/// Chain [`AggExpr::descending`] to flip the direction.
#[must_use]
pub fn within_radius(
    max_distance: f64,
    passthrough: Vec<Expr>,
    distance: impl Into<Expr>,
) -> AggExpr {
    AggExpr {
        func: AggFunc::WithinRadius,
        column: None,
        params: vec![Value::Float(max_distance)],
        passthrough,
        order_column: Some(Box::new(distance.into())),
        descending: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnRef;
    use crate::compile::compile_expr;
    use crate::env::VarEnv;

    fn col(rel: &str, name: &str) -> Expr {
        Expr::Column(ColumnRef::new(rel, name))
    }

    fn render(agg: AggExpr) -> String {
        let mut env = VarEnv::new();
        compile_expr(&Expr::Aggregate(agg), &mut env)
    }

    #[test]
    fn test_simple_aggregates() {
        assert_eq!(render(count(col("e", "id"))), "count<Id>");
        assert_eq!(render(count_distinct(col("e", "id"))), "count_distinct<Id>");
        assert_eq!(render(sum(col("e", "salary"))), "sum<Salary>");
        assert_eq!(render(min(col("e", "salary"))), "min<Salary>");
        assert_eq!(render(max(col("e", "salary"))), "max<Salary>");
        assert_eq!(render(avg(col("e", "salary"))), "avg<Salary>");
    }

    #[test]
    fn test_count_all() {
        assert_eq!(render(count_all()), "count<>");
    }

    #[test]
    fn test_top_k() {
        let agg = top_k(5, vec![col("d", "id")], col("d", "score"));
        assert_eq!(render(agg), "top_k<5, Id, Score:desc>");
    }

    #[test]
    fn test_top_k_ascending() {
        let agg = top_k(5, vec![col("d", "id")], col("d", "score")).ascending();
        assert_eq!(render(agg), "top_k<5, Id, Score:asc>");
    }

    #[test]
    fn test_top_k_threshold() {
        let agg = top_k_threshold(10, 0.8, vec![col("d", "id")], col("d", "score"));
        assert_eq!(render(agg), "top_k_threshold<10, 0.8, Id, Score:desc>");
    }

    #[test]
    fn test_within_radius() {
        let agg = within_radius(0.5, vec![col("d", "id")], col("d", "dist"));
        assert_eq!(render(agg), "within_radius<0.5, Id, Dist:asc>");
    }

    #[test]
    fn test_multiple_passthrough() {
        let agg = top_k(
            3,
            vec![col("d", "id"), col("d", "title")],
            col("d", "score"),
        );
        assert_eq!(render(agg), "top_k<3, Id, Title, Score:desc>");
    }
}
