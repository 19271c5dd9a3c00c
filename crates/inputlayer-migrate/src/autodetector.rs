//! Autodetector: diff two model states into an ordered operation list.

use crate::operations::Operation;
use crate::state::{IndexState, ModelState};

/// Diffs two states and returns the operations that transform `old` into
/// `new`.
///
/// Ordering is load-bearing:
///
/// 1. Create new relations (rules may reference them).
/// 2. Recreate relations whose column list changed (the engine cannot
///    alter in place, so this is drop + create).
/// 3. Drop removed rules (before the relations they read disappear).
/// 4. Replace modified rules.
/// 5. Create new rules.
/// 6. Drop removed relations.
/// 7. Drop removed indexes, recreate modified ones, create new ones.
///
/// Within each phase, entities are processed in name order, so the
/// output is fully determined by the two inputs.
#[must_use]
pub fn detect_changes(old: &ModelState, new: &ModelState) -> Vec<Operation> {
    let mut ops = Vec::new();

    // 1. New relations.
    for (name, columns) in &new.relations {
        if !old.relations.contains_key(name) {
            ops.push(Operation::create_relation(name.clone(), columns.clone()));
        }
    }

    // 2. Changed relations: drop + recreate.
    for (name, old_columns) in &old.relations {
        if let Some(new_columns) = new.relations.get(name) {
            if old_columns != new_columns {
                ops.push(Operation::drop_relation(name.clone(), old_columns.clone()));
                ops.push(Operation::create_relation(name.clone(), new_columns.clone()));
            }
        }
    }

    // 3. Dropped rules.
    for (name, clauses) in &old.rules {
        if !new.rules.contains_key(name) {
            ops.push(Operation::drop_rule(name.clone(), clauses.clone()));
        }
    }

    // 4. Modified rules.
    for (name, old_clauses) in &old.rules {
        if let Some(new_clauses) = new.rules.get(name) {
            if old_clauses != new_clauses {
                ops.push(Operation::replace_rule(
                    name.clone(),
                    old_clauses.clone(),
                    new_clauses.clone(),
                ));
            }
        }
    }

    // 5. New rules.
    for (name, clauses) in &new.rules {
        if !old.rules.contains_key(name) {
            ops.push(Operation::create_rule(name.clone(), clauses.clone()));
        }
    }

    // 6. Dropped relations, now that their rules are gone.
    for (name, columns) in &old.relations {
        if !new.relations.contains_key(name) {
            ops.push(Operation::drop_relation(name.clone(), columns.clone()));
        }
    }

    // 7. Dropped indexes.
    for (name, info) in &old.indexes {
        if !new.indexes.contains_key(name) {
            ops.push(drop_index(name, info));
        }
    }

    // 8. Modified indexes: drop + recreate.
    for (name, old_info) in &old.indexes {
        if let Some(new_info) = new.indexes.get(name) {
            if old_info != new_info {
                ops.push(drop_index(name, old_info));
                ops.push(create_index(name, new_info));
            }
        }
    }

    // 9. New indexes.
    for (name, info) in &new.indexes {
        if !old.indexes.contains_key(name) {
            ops.push(create_index(name, info));
        }
    }

    ops
}

fn create_index(name: &str, info: &IndexState) -> Operation {
    Operation::CreateIndex {
        name: name.to_string(),
        relation: info.relation.clone(),
        column: info.column.clone(),
        metric: info.metric.clone(),
        m: info.m,
        ef_construction: info.ef_construction,
        ef_search: info.ef_search,
    }
}

fn drop_index(name: &str, info: &IndexState) -> Operation {
    Operation::DropIndex {
        name: name.to_string(),
        relation: info.relation.clone(),
        column: info.column.clone(),
        metric: info.metric.clone(),
        m: info.m,
        ef_construction: info.ef_construction,
        ef_search: info.ef_search,
    }
}
