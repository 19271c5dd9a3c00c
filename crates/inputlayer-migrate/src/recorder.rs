//! Migration recorder: tracks applied migrations inside the target
//! store itself, in a reserved relation.

use std::collections::BTreeSet;

use chrono::Utc;

use inputlayer_core::executor::Execute;
use inputlayer_core::types::Value;

use crate::error::Result;

/// The reserved relation holding applied-migration records.
pub const MIGRATION_RELATION: &str = "__inputlayer_migrations__";

/// Records applied migrations in the target store.
///
/// The recorder borrows the executor only for the duration of each call
/// site, so the migration engine can interleave recording with its own
/// commands.
pub struct MigrationRecorder<'a, E: Execute> {
    kg: &'a mut E,
}

impl<'a, E: Execute> MigrationRecorder<'a, E> {
    /// Creates a recorder over an executor.
    pub fn new(kg: &'a mut E) -> Self {
        Self { kg }
    }

    /// Declares the tracking relation. Idempotent: the engine treats a
    /// repeated identical declaration as a no-op.
    ///
    /// # Errors
    ///
    /// Propagates executor failures.
    pub fn ensure_schema(&mut self) -> Result<()> {
        self.kg
            .execute(&format!("+{MIGRATION_RELATION}(name: string, applied_at: string)"))?;
        Ok(())
    }

    /// The sorted, distinct list of applied migration names.
    ///
    /// # Errors
    ///
    /// Propagates executor failures.
    pub fn get_applied(&mut self) -> Result<Vec<String>> {
        let result = self
            .kg
            .execute(&format!("?Name, At <- {MIGRATION_RELATION}(Name, At)"))?;
        let names: BTreeSet<String> = result
            .rows
            .iter()
            .filter_map(|row| match row.first() {
                Some(Value::Str(name)) => Some(name.clone()),
                Some(other) => Some(other.encode()),
                None => None,
            })
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Records that `name` has been applied, stamped with the current
    /// UTC time in ISO-8601 form.
    ///
    /// # Errors
    ///
    /// Propagates executor failures.
    pub fn record_applied(&mut self, name: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.kg
            .execute(&format!("+{MIGRATION_RELATION}(\"{name}\", \"{now}\")"))?;
        Ok(())
    }

    /// Removes every record for a reverted migration.
    ///
    /// # Errors
    ///
    /// Propagates executor failures.
    pub fn record_reverted(&mut self, name: &str) -> Result<()> {
        self.kg.execute(&format!(
            "-{MIGRATION_RELATION}(Name, At) <- {MIGRATION_RELATION}(Name, At), Name = \"{name}\""
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputlayer_core::executor::{CommandResult, ExecuteError};

    /// Records every command; serves canned rows for recorder queries.
    struct MockKg {
        commands: Vec<String>,
        applied_rows: Vec<Vec<Value>>,
    }

    impl MockKg {
        fn new(applied: &[&str]) -> Self {
            Self {
                commands: Vec::new(),
                applied_rows: applied
                    .iter()
                    .map(|name| {
                        vec![
                            Value::Str((*name).to_string()),
                            Value::Str("2024-01-01T00:00:00+00:00".to_string()),
                        ]
                    })
                    .collect(),
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
                    rows: self.applied_rows.clone(),
                });
            }
            Ok(CommandResult::empty())
        }
    }

    #[test]
    fn test_ensure_schema_declares_reserved_relation() {
        let mut kg = MockKg::new(&[]);
        MigrationRecorder::new(&mut kg).ensure_schema().unwrap();
        assert_eq!(
            kg.commands,
            vec!["+__inputlayer_migrations__(name: string, applied_at: string)"]
        );
    }

    #[test]
    fn test_get_applied_empty() {
        let mut kg = MockKg::new(&[]);
        assert!(MigrationRecorder::new(&mut kg).get_applied().unwrap().is_empty());
    }

    #[test]
    fn test_get_applied_is_sorted_and_distinct() {
        let mut kg = MockKg::new(&["0002_auto", "0001_initial", "0002_auto"]);
        let applied = MigrationRecorder::new(&mut kg).get_applied().unwrap();
        assert_eq!(applied, vec!["0001_initial", "0002_auto"]);
    }

    #[test]
    fn test_record_applied_inserts_fact() {
        let mut kg = MockKg::new(&[]);
        MigrationRecorder::new(&mut kg)
            .record_applied("0001_initial")
            .unwrap();
        let cmd = &kg.commands[0];
        assert!(cmd.starts_with("+__inputlayer_migrations__(\"0001_initial\", \""));
        assert!(cmd.ends_with("\")"));
    }

    #[test]
    fn test_record_reverted_deletes_matching_facts() {
        let mut kg = MockKg::new(&[]);
        MigrationRecorder::new(&mut kg)
            .record_reverted("0002_auto")
            .unwrap();
        assert_eq!(
            kg.commands,
            vec![
                "-__inputlayer_migrations__(Name, At) <- \
                 __inputlayer_migrations__(Name, At), Name = \"0002_auto\""
            ]
        );
    }
}
