//! Expression AST types.
//!
//! All nodes are immutable plain data with structural equality. They are
//! built through the [`Column`](crate::column::Column) proxy and the
//! aggregation/function vocabulary, and lowered to Datalog text by the
//! [`compile`](crate::compile) module.

use crate::types::Value;

/// Reference to a relation column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Relation name.
    pub relation: String,
    /// Column name.
    pub column: String,
    /// Alias for self-join disambiguation.
    pub alias: Option<String>,
}

impl ColumnRef {
    /// Creates a new column reference.
    #[must_use]
    pub fn new(relation: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            column: column.into(),
            alias: None,
        }
    }

    /// Creates an aliased column reference (self-join).
    #[must_use]
    pub fn aliased(
        relation: impl Into<String>,
        column: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.into(),
            column: column.into(),
            alias: Some(alias.into()),
        }
    }

    /// The key prefix used by the variable environment: the alias when
    /// present, otherwise the relation name.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.relation)
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    /// Returns the Datalog representation of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    /// Returns the Datalog representation of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// A built-in function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    /// Function name, passed through verbatim.
    pub name: String,
    /// Arguments.
    pub args: Vec<Expr>,
}

/// Aggregation function names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Count,
    CountDistinct,
    Sum,
    Min,
    Max,
    Avg,
    TopK,
    TopKThreshold,
    WithinRadius,
}

impl AggFunc {
    /// Returns the Datalog aggregation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::TopK => "top_k",
            Self::TopKThreshold => "top_k_threshold",
            Self::WithinRadius => "within_radius",
        }
    }
}

/// An aggregation expression, rendered as `func<params…, passthrough…, col>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggExpr {
    /// The aggregation function.
    pub func: AggFunc,
    /// The aggregated column (absent for bare `count`).
    pub column: Option<Box<Expr>>,
    /// Leading scalar parameters (k, threshold, radius).
    pub params: Vec<Value>,
    /// Passthrough columns carried alongside the aggregate.
    pub passthrough: Vec<Expr>,
    /// Ordering column for `top_k` / `within_radius` style aggregates.
    pub order_column: Option<Box<Expr>>,
    /// Ordering direction for the order column.
    pub descending: bool,
}

impl AggExpr {
    /// Flips the order column to ascending.
    #[must_use]
    pub fn ascending(mut self) -> Self {
        self.descending = false;
        self
    }

    /// Flips the order column to descending.
    #[must_use]
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }
}

/// A Datalog value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference.
    Column(ColumnRef),

    /// A literal value.
    Literal(Value),

    /// A binary arithmetic expression.
    Arithmetic {
        /// Operator.
        op: ArithOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A built-in function call.
    Call(FuncCall),

    /// A column decorated with a sort direction.
    Ordered {
        /// The underlying expression.
        expr: Box<Expr>,
        /// Sort direction.
        descending: bool,
    },

    /// An aggregation.
    Aggregate(AggExpr),
}

impl Expr {
    /// Creates a function-call expression.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call(FuncCall {
            name: name.into(),
            args,
        })
    }

    /// Wraps this expression with an ascending sort marker.
    #[must_use]
    pub fn asc(self) -> Self {
        Self::Ordered {
            expr: Box::new(self),
            descending: false,
        }
    }

    /// Wraps this expression with a descending sort marker.
    #[must_use]
    pub fn desc(self) -> Self {
        Self::Ordered {
            expr: Box::new(self),
            descending: true,
        }
    }
}

impl From<ColumnRef> for Expr {
    fn from(c: ColumnRef) -> Self {
        Self::Column(c)
    }
}

impl From<AggExpr> for Expr {
    fn from(a: AggExpr) -> Self {
        Self::Aggregate(a)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Self::Literal(Value::Bool(v))
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Self::Literal(Value::Int(v))
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Self::Literal(Value::Int(i64::from(v)))
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Self::Literal(Value::Float(v))
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Self::Literal(Value::Str(v.to_string()))
    }
}

impl From<String> for Expr {
    fn from(v: String) -> Self {
        Self::Literal(Value::Str(v))
    }
}

/// Wraps a plain value into a literal expression.
#[must_use]
pub fn lit(v: impl Into<Value>) -> Expr {
    Expr::Literal(v.into())
}

/// A boolean condition over relation rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// A binary comparison. `Column = Column` equality doubles as a join
    /// condition and compiles to a variable unification.
    Compare {
        /// Comparison operator.
        op: CmpOp,
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },

    /// Logical AND (Datalog comma).
    And(Box<Cond>, Box<Cond>),

    /// Logical OR; requires splitting into multiple queries.
    Or(Box<Cond>, Box<Cond>),

    /// Negation of a condition.
    Not(Box<Cond>),

    /// Membership of a value in another relation's column.
    In {
        /// The tested expression.
        expr: Expr,
        /// The target column.
        target: ColumnRef,
        /// Ordered column names of the target relation, for the
        /// positional body atom.
        target_columns: Vec<String>,
        /// Whether the membership is negated.
        negated: bool,
    },

    /// Multi-column existence check against a relation.
    Match {
        /// Target relation name.
        relation: String,
        /// Ordered column names of the target relation.
        relation_columns: Vec<String>,
        /// Bindings from target column to source expression.
        bindings: Vec<(String, Expr)>,
        /// Whether the existence check is negated.
        negated: bool,
    },
}

impl Cond {
    /// Combines two conditions with AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines two conditions with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negates this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Returns true if the condition contains an OR node anywhere.
    #[must_use]
    pub fn has_or(&self) -> bool {
        match self {
            Self::Or(..) => true,
            Self::And(l, r) => l.has_or() || r.has_or(),
            Self::Not(inner) => inner.has_or(),
            Self::Compare { .. } | Self::In { .. } | Self::Match { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_strings() {
        assert_eq!(ArithOp::Add.as_str(), "+");
        assert_eq!(ArithOp::Mod.as_str(), "%");
        assert_eq!(CmpOp::Eq.as_str(), "=");
        assert_eq!(CmpOp::NotEq.as_str(), "!=");
        assert_eq!(CmpOp::GtEq.as_str(), ">=");
    }

    #[test]
    fn test_lit_wraps_values() {
        assert_eq!(lit(42_i64), Expr::Literal(Value::Int(42)));
        assert_eq!(lit("eng"), Expr::Literal(Value::Str("eng".into())));
    }

    #[test]
    fn test_structural_equality() {
        let a = Expr::Arithmetic {
            op: ArithOp::Add,
            left: Box::new(Expr::Column(ColumnRef::new("employee", "salary"))),
            right: Box::new(lit(1000_i64)),
        };
        let b = Expr::Arithmetic {
            op: ArithOp::Add,
            left: Box::new(Expr::Column(ColumnRef::new("employee", "salary"))),
            right: Box::new(lit(1000_i64)),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_has_or() {
        let cmp = Cond::Compare {
            op: CmpOp::Eq,
            left: Expr::Column(ColumnRef::new("e", "a")),
            right: lit(1_i64),
        };
        assert!(!cmp.has_or());
        assert!(cmp.clone().or(cmp.clone()).has_or());
        assert!(cmp.clone().and(cmp.clone().or(cmp.clone())).has_or());
        assert!(cmp.clone().or(cmp.clone()).negate().has_or());
    }

    #[test]
    fn test_column_ref_scope() {
        assert_eq!(ColumnRef::new("employee", "id").scope(), "employee");
        assert_eq!(ColumnRef::aliased("follow", "src", "follow_1").scope(), "follow_1");
    }
}
