//! Variable environment: union-find over column keys producing canonical
//! Datalog variable names.
//!
//! Join conditions like `e.department = d.name` unify two columns so both
//! positions render as one shared variable. Naming is deterministic: the
//! first-seen column wins its capitalized name; later columns that would
//! collide with a different union root get a `_N` suffix from a
//! monotonically increasing counter.

use std::collections::HashMap;

use crate::ast::ColumnRef;
use crate::naming::column_to_variable;

type Key = (String, String);

fn key_of(col: &ColumnRef) -> Key {
    (col.scope().to_string(), col.column.clone())
}

/// Per-compilation variable environment.
///
/// One environment lives for exactly one lowering call and never escapes
/// it; disjoint environments compile to byte-identical output.
#[derive(Debug, Default)]
pub struct VarEnv {
    parent: HashMap<Key, Key>,
    names: HashMap<Key, String>,
    counter: u32,
}

impl VarEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&mut self, key: Key) -> Key {
        let mut root = key.clone();
        while let Some(p) = self.parent.get(&root) {
            if *p == root {
                break;
            }
            root = p.clone();
        }
        // Path compression.
        let mut cur = key;
        while let Some(p) = self.parent.get(&cur).cloned() {
            if p == cur {
                break;
            }
            self.parent.insert(cur, root.clone());
            cur = p;
        }
        root
    }

    fn union(&mut self, a: Key, b: Key) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(rb, ra);
        }
    }

    fn fresh_name(&mut self, column: &str) -> String {
        let mut var = column_to_variable(column);
        if self.names.values().any(|v| v == &var) {
            self.counter += 1;
            var = format!("{var}_{}", self.counter);
        }
        var
    }

    /// Gets or creates the variable for a column.
    pub fn var(&mut self, col: &ColumnRef) -> String {
        let root = self.find(key_of(col));
        if let Some(name) = self.names.get(&root) {
            return name.clone();
        }
        let var = self.fresh_name(&col.column);
        self.names.insert(root, var.clone());
        var
    }

    /// Unifies two columns to a single variable (a join condition) and
    /// returns it. The left column's name wins when neither side has a
    /// variable yet.
    pub fn unify(&mut self, a: &ColumnRef, b: &ColumnRef) -> String {
        self.union(key_of(a), key_of(b));
        let root = self.find(key_of(a));
        if let Some(name) = self.names.get(&root) {
            return name.clone();
        }
        let var = self.fresh_name(&a.column);
        self.names.insert(root, var.clone());
        var
    }

    /// Looks up the variable for a column without creating one.
    pub fn lookup(&mut self, col: &ColumnRef) -> Option<String> {
        let root = self.find(key_of(col));
        self.names.get(&root).cloned()
    }

    /// Pre-binds a column to a fixed variable name. Used by conditional
    /// deletes, which name positions `X0`, `X1`, … in column order.
    pub fn bind(&mut self, col: &ColumnRef, var: impl Into<String>) {
        let root = self.find(key_of(col));
        self.names.insert(root, var.into());
    }
}
