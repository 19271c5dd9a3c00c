//! Migration executor: apply and revert migrations against a target
//! store.

use std::collections::BTreeSet;

use tracing::{debug, info};

use inputlayer_core::executor::Execute;

use crate::error::{MigrateError, Result};
use crate::loader::MigrationInfo;
use crate::recorder::MigrationRecorder;

/// Applies one migration: every operation's forward commands, in
/// declaration order. The first failing command aborts; already-issued
/// commands are not rolled back.
///
/// # Errors
///
/// Propagates executor failures.
pub fn apply_migration<E: Execute>(kg: &mut E, migration: &MigrationInfo) -> Result<()> {
    info!(name = %migration.name, "Applying migration");
    for op in &migration.operations {
        for cmd in op.forward_commands() {
            debug!(command = %cmd, "Executing");
            kg.execute(&cmd)?;
        }
    }
    Ok(())
}

/// Reverts one migration: every operation's backward commands, with the
/// operations visited in reverse declaration order.
///
/// # Errors
///
/// Propagates executor failures.
pub fn revert_migration<E: Execute>(kg: &mut E, migration: &MigrationInfo) -> Result<()> {
    info!(name = %migration.name, "Reverting migration");
    for op in migration.operations.iter().rev() {
        for cmd in op.backward_commands() {
            debug!(command = %cmd, "Executing");
            kg.execute(&cmd)?;
        }
    }
    Ok(())
}

/// Applies every migration not yet recorded as applied, in order,
/// recording each one. With a `target`, stops after applying (or
/// reaching) it. Returns the names applied by this call; running again
/// immediately returns an empty list.
///
/// # Errors
///
/// Propagates executor failures.
pub fn migrate<E: Execute>(
    kg: &mut E,
    migrations: &[MigrationInfo],
    target: Option<&str>,
) -> Result<Vec<String>> {
    let applied: BTreeSet<String> = {
        let mut recorder = MigrationRecorder::new(kg);
        recorder.ensure_schema()?;
        recorder.get_applied()?.into_iter().collect()
    };

    let mut applied_names = Vec::new();
    for migration in migrations {
        if applied.contains(&migration.name) {
            if target == Some(migration.name.as_str()) {
                break;
            }
            continue;
        }

        apply_migration(kg, migration)?;
        MigrationRecorder::new(kg).record_applied(&migration.name)?;
        applied_names.push(migration.name.clone());

        if target == Some(migration.name.as_str()) {
            break;
        }
    }

    Ok(applied_names)
}

/// Reverts every applied migration strictly after `target`, newest
/// first, recording each reversion. A no-op when nothing newer than
/// `target` is applied.
///
/// # Errors
///
/// Returns [`MigrateError::MigrationNotFound`] when `target` is not in
/// `migrations`, and propagates executor failures.
pub fn revert_to<E: Execute>(
    kg: &mut E,
    migrations: &[MigrationInfo],
    target: &str,
) -> Result<Vec<String>> {
    let applied: BTreeSet<String> = {
        let mut recorder = MigrationRecorder::new(kg);
        recorder.ensure_schema()?;
        recorder.get_applied()?.into_iter().collect()
    };

    let target_idx = migrations
        .iter()
        .position(|m| m.name == target)
        .ok_or_else(|| MigrateError::MigrationNotFound(target.to_string()))?;

    let mut reverted_names = Vec::new();
    for migration in migrations[target_idx + 1..].iter().rev() {
        if !applied.contains(&migration.name) {
            continue;
        }
        revert_migration(kg, migration)?;
        MigrationRecorder::new(kg).record_reverted(&migration.name)?;
        reverted_names.push(migration.name.clone());
    }

    Ok(reverted_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use crate::state::ModelState;
    use inputlayer_core::executor::{CommandResult, ExecuteError};
    use inputlayer_core::types::Value;

    fn cols(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
            .collect()
    }

    fn migration(name: &str, number: u32, operations: Vec<Operation>) -> MigrationInfo {
        MigrationInfo {
            name: name.to_string(),
            number,
            filename: format!("{name}.json"),
            dependencies: vec![],
            operations,
            state: ModelState::new(),
        }
    }

    /// Mock store: records commands and simulates the recorder relation.
    struct MockKg {
        commands: Vec<String>,
        applied: Vec<String>,
    }

    impl MockKg {
        fn new() -> Self {
            Self {
                commands: Vec::new(),
                applied: Vec::new(),
            }
        }
    }

    impl Execute for MockKg {
        fn execute(
            &mut self,
            program: &str,
        ) -> std::result::Result<CommandResult, ExecuteError> {
            self.commands.push(program.to_string());
            if program.starts_with("?Name, At") {
                return Ok(CommandResult {
                    columns: vec!["Name".to_string(), "At".to_string()],
                    rows: self
                        .applied
                        .iter()
                        .map(|name| {
                            vec![Value::Str(name.clone()), Value::Str(String::new())]
                        })
                        .collect(),
                });
            }
            if let Some(rest) = program.strip_prefix("+__inputlayer_migrations__(\"") {
                if let Some(name) = rest.split('"').next() {
                    self.applied.push(name.to_string());
                }
            }
            if program.starts_with("-__inputlayer_migrations__(") {
                if let Some(name) = program.rsplit('"').nth(1) {
                    self.applied.retain(|n| n != name);
                }
            }
            Ok(CommandResult::empty())
        }
    }

    #[test]
    fn test_apply_runs_forward_commands_in_order() {
        let mut kg = MockKg::new();
        let m = migration(
            "0001_initial",
            1,
            vec![
                Operation::create_relation("t", cols(&[("a", "int")])),
                Operation::create_rule("r", vec!["+r(X) <- t(X)".to_string()]),
            ],
        );
        apply_migration(&mut kg, &m).unwrap();
        assert_eq!(kg.commands, vec!["+t(a: int)", "+r(X) <- t(X)"]);
    }

    #[test]
    fn test_revert_runs_backward_commands_in_reverse() {
        let mut kg = MockKg::new();
        let m = migration(
            "0001_initial",
            1,
            vec![
                Operation::create_relation("t", cols(&[("a", "int")])),
                Operation::create_rule("r", vec!["+r(X) <- t(X)".to_string()]),
            ],
        );
        revert_migration(&mut kg, &m).unwrap();
        assert_eq!(kg.commands, vec![".rule drop r", ".rel drop t"]);
    }

    #[test]
    fn test_migrate_applies_all_then_nothing() {
        let mut kg = MockKg::new();
        let m1 = migration(
            "0001_initial",
            1,
            vec![Operation::create_relation("t", cols(&[("a", "int")]))],
        );
        let m2 = migration(
            "0002_auto",
            2,
            vec![Operation::create_rule("r", vec!["+r(X) <- t(X)".to_string()])],
        );
        let migrations = vec![m1, m2];

        let applied = migrate(&mut kg, &migrations, None).unwrap();
        assert_eq!(applied, vec!["0001_initial", "0002_auto"]);

        let applied = migrate(&mut kg, &migrations, None).unwrap();
        assert!(applied.is_empty());
    }

    #[test]
    fn test_migrate_skips_already_applied() {
        let mut kg = MockKg::new();
        kg.applied.push("0001_initial".to_string());
        let m1 = migration(
            "0001_initial",
            1,
            vec![Operation::create_relation("t", cols(&[("a", "int")]))],
        );
        let m2 = migration(
            "0002_auto",
            2,
            vec![Operation::create_rule("r", vec!["+r(X) <- t(X)".to_string()])],
        );

        let applied = migrate(&mut kg, &[m1, m2], None).unwrap();
        assert_eq!(applied, vec!["0002_auto"]);
        assert!(!kg.commands.iter().any(|c| c == "+t(a: int)"));
    }

    #[test]
    fn test_migrate_stops_after_target() {
        let mut kg = MockKg::new();
        let migrations = vec![
            migration("0001_initial", 1, vec![]),
            migration("0002_auto", 2, vec![]),
            migration("0003_auto", 3, vec![]),
        ];
        let applied = migrate(&mut kg, &migrations, Some("0002_auto")).unwrap();
        assert_eq!(applied, vec!["0001_initial", "0002_auto"]);
    }

    #[test]
    fn test_revert_to_unwinds_suffix_in_reverse() {
        let mut kg = MockKg::new();
        let migrations = vec![
            migration(
                "0001_initial",
                1,
                vec![Operation::create_relation("t", cols(&[("a", "int")]))],
            ),
            migration(
                "0002_auto",
                2,
                vec![Operation::create_rule("r", vec!["+r(X) <- t(X)".to_string()])],
            ),
            migration(
                "0003_auto",
                3,
                vec![Operation::create_relation("s", cols(&[("b", "string")]))],
            ),
        ];
        migrate(&mut kg, &migrations, None).unwrap();

        let reverted = revert_to(&mut kg, &migrations, "0001_initial").unwrap();
        assert_eq!(reverted, vec!["0003_auto", "0002_auto"]);

        let applied = MigrationRecorder::new(&mut kg).get_applied().unwrap();
        assert_eq!(applied, vec!["0001_initial"]);
    }

    #[test]
    fn test_revert_to_is_noop_at_head() {
        let mut kg = MockKg::new();
        let migrations = vec![migration("0001_initial", 1, vec![])];
        migrate(&mut kg, &migrations, None).unwrap();
        let reverted = revert_to(&mut kg, &migrations, "0001_initial").unwrap();
        assert!(reverted.is_empty());
    }

    #[test]
    fn test_revert_to_unknown_target() {
        let mut kg = MockKg::new();
        let result = revert_to(&mut kg, &[], "0099_nope");
        assert!(matches!(
            result,
            Err(MigrateError::MigrationNotFound(name)) if name == "0099_nope"
        ));
    }
}
