//! Object–logic mapping for the InputLayer knowledge-graph engine.
//!
//! `inputlayer-core` lets applications express typed relations, facts,
//! queries, rules, and vector indexes as Rust values, and compiles them
//! into the textual Datalog dialect the engine executes. Applications
//! never hand-write the textual programs.
//!
//! # Architecture
//!
//! - **Relation model** — the [`Relation`](relation::Relation) trait
//!   (implemented by `#[derive(Relation)]` from `inputlayer-derive`)
//!   exposes a relation's name and declaration-ordered columns.
//! - **Expression AST** — immutable [`ast`] nodes built through typed
//!   [`column`] proxies and the [`aggregations`]/[`functions`]
//!   vocabulary.
//! - **Compiler** — the [`compile`] module lowers schemas, facts,
//!   queries, and rules to Datalog text, unifying join variables through
//!   a union-find [`env::VarEnv`] and fanning OR filters out into one
//!   query per branch.
//! - **Executor contract** — [`executor::Execute`] is the single seam to
//!   the outside world: one program in, one tabular result out.
//!
//! # Example
//!
//! ```rust,ignore
//! use inputlayer_core::prelude::*;
//!
//! #[derive(Relation)]
//! struct Employee {
//!     id: i64,
//!     name: String,
//!     department: String,
//!     salary: f64,
//!     active: bool,
//! }
//!
//! let program = Query::new()
//!     .select_relation::<Employee>()
//!     .filter(Employee::department().eq(lit("eng")))
//!     .compile()?;
//! ```

pub mod aggregations;
pub mod ast;
pub mod column;
pub mod compile;
pub mod env;
pub mod error;
pub mod executor;
pub mod functions;
pub mod index;
pub mod meta;
pub mod naming;
pub mod relation;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::ast::{lit, AggExpr, ColumnRef, Cond, Expr};
    pub use crate::column::Column;
    pub use crate::compile::{
        compile_bulk_insert, compile_conditional_delete, compile_delete, compile_insert,
        compile_rule, compile_schema, ClauseBuilder, Compiled, Derived, Query, RuleClause,
    };
    pub use crate::error::{CompileError, Result};
    pub use crate::executor::{CommandResult, Execute, ExecuteError};
    pub use crate::index::{HnswIndex, Metric};
    pub use crate::relation::{Relation, RelationRef, RelationSchema};
    pub use crate::types::{StorageType, Timestamp, Value, Vector, VectorInt8};
}
