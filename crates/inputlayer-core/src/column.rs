//! Column proxies: the builder surface that turns typed column access
//! into AST nodes.
//!
//! A [`Column`] carries the AST reference together with its owning
//! relation's schema, so the query compiler can derive body atoms from
//! selected columns and membership tests can emit positional atoms.

use crate::ast::{ArithOp, CmpOp, ColumnRef, Cond, Expr};
use crate::relation::{Relation, RelationSchema};

/// A typed column proxy for query building.
///
/// Returned by the accessors `#[derive(Relation)]` generates (for example
/// `Employee::salary()`) and by [`RelationRef::col`](crate::relation::RelationRef::col)
/// for self-join references.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    target: ColumnRef,
    owner: RelationSchema,
}

impl Column {
    /// Creates a column proxy.
    #[must_use]
    pub fn new(owner: RelationSchema, name: &str, alias: Option<String>) -> Self {
        Self {
            target: ColumnRef {
                relation: owner.name.clone(),
                column: name.to_string(),
                alias,
            },
            owner,
        }
    }

    /// The AST column reference.
    #[must_use]
    pub fn column_ref(&self) -> ColumnRef {
        self.target.clone()
    }

    /// The owning relation's schema.
    #[must_use]
    pub fn owner(&self) -> &RelationSchema {
        &self.owner
    }

    /// The alias when present, otherwise the relation name.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.target.scope()
    }

    fn compare(self, op: CmpOp, other: impl Into<Expr>) -> Cond {
        Cond::Compare {
            op,
            left: Expr::Column(self.target),
            right: other.into(),
        }
    }

    /// `self = other`. With a column on the right this is a join
    /// condition and unifies the two variables.
    #[must_use]
    pub fn eq(self, other: impl Into<Expr>) -> Cond {
        self.compare(CmpOp::Eq, other)
    }

    /// `self != other`.
    #[must_use]
    pub fn ne(self, other: impl Into<Expr>) -> Cond {
        self.compare(CmpOp::NotEq, other)
    }

    /// `self < other`.
    #[must_use]
    pub fn lt(self, other: impl Into<Expr>) -> Cond {
        self.compare(CmpOp::Lt, other)
    }

    /// `self <= other`.
    #[must_use]
    pub fn le(self, other: impl Into<Expr>) -> Cond {
        self.compare(CmpOp::LtEq, other)
    }

    /// `self > other`.
    #[must_use]
    pub fn gt(self, other: impl Into<Expr>) -> Cond {
        self.compare(CmpOp::Gt, other)
    }

    /// `self >= other`.
    #[must_use]
    pub fn ge(self, other: impl Into<Expr>) -> Cond {
        self.compare(CmpOp::GtEq, other)
    }

    fn arith(self, op: ArithOp, other: impl Into<Expr>) -> Expr {
        Expr::Arithmetic {
            op,
            left: Box::new(Expr::Column(self.target)),
            right: Box::new(other.into()),
        }
    }

    /// `self + other`.
    #[must_use]
    pub fn add(self, other: impl Into<Expr>) -> Expr {
        self.arith(ArithOp::Add, other)
    }

    /// `self - other`.
    #[must_use]
    pub fn sub(self, other: impl Into<Expr>) -> Expr {
        self.arith(ArithOp::Sub, other)
    }

    /// `self * other`.
    #[must_use]
    pub fn mul(self, other: impl Into<Expr>) -> Expr {
        self.arith(ArithOp::Mul, other)
    }

    /// `self / other`.
    #[must_use]
    pub fn div(self, other: impl Into<Expr>) -> Expr {
        self.arith(ArithOp::Div, other)
    }

    /// `self % other`.
    #[must_use]
    pub fn rem(self, other: impl Into<Expr>) -> Expr {
        self.arith(ArithOp::Mod, other)
    }

    /// Marks this column ascending for ordering.
    #[must_use]
    pub fn asc(self) -> Expr {
        Expr::from(self).asc()
    }

    /// Marks this column descending for ordering.
    #[must_use]
    pub fn desc(self) -> Expr {
        Expr::from(self).desc()
    }

    /// Tests whether this column's value appears in `other`'s column of
    /// its relation.
    #[must_use]
    pub fn in_(self, other: Column) -> Cond {
        Cond::In {
            expr: Expr::Column(self.target),
            target_columns: other.owner.column_names(),
            target: other.target,
            negated: false,
        }
    }

    /// Negated membership test.
    #[must_use]
    pub fn not_in(self, other: Column) -> Cond {
        Cond::In {
            expr: Expr::Column(self.target),
            target_columns: other.owner.column_names(),
            target: other.target,
            negated: true,
        }
    }

    /// Multi-column existence check: rows of `R` whose `on` target
    /// columns match columns of this column's relation.
    ///
    /// Each `(target_column, source_column)` pair binds a column of `R`
    /// to a column of this proxy's relation.
    #[must_use]
    pub fn matches<R: Relation>(&self, on: &[(&str, &str)]) -> Cond {
        self.match_expr::<R>(on, false)
    }

    /// Negated multi-column existence check.
    #[must_use]
    pub fn not_matches<R: Relation>(&self, on: &[(&str, &str)]) -> Cond {
        self.match_expr::<R>(on, true)
    }

    fn match_expr<R: Relation>(&self, on: &[(&str, &str)], negated: bool) -> Cond {
        let target = R::schema();
        let bindings = on
            .iter()
            .map(|(target_col, source_col)| {
                let source = ColumnRef {
                    relation: self.target.relation.clone(),
                    column: (*source_col).to_string(),
                    alias: self.target.alias.clone(),
                };
                ((*target_col).to_string(), Expr::Column(source))
            })
            .collect();
        Cond::Match {
            relation_columns: target.column_names(),
            relation: target.name,
            bindings,
            negated,
        }
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Self::Column(c.target)
    }
}
