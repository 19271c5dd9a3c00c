//! The executor contract the migration engine consumes.
//!
//! The core never talks to the network itself; it hands finished Datalog
//! programs to an [`Execute`] implementation and reads back a tabular
//! result. The WebSocket client implements this trait; tests use scripted
//! mocks.

use crate::error::CompileError;
use crate::types::Value;

/// A tabular command result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandResult {
    /// Column names; empty for mutating commands.
    pub columns: Vec<String>,
    /// Result rows; empty on success for mutating commands.
    pub rows: Vec<Vec<Value>>,
}

impl CommandResult {
    /// An empty (mutating-command) result.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Error surfaced by an executor.
#[derive(Debug, thiserror::Error)]
#[error("Execution failed: {0}")]
pub struct ExecuteError(pub String);

/// Executes one textual Datalog program and returns one tabular result.
pub trait Execute {
    /// Executes `program` against the bound knowledge graph.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] when the engine rejects the program or
    /// the transport fails.
    fn execute(&mut self, program: &str) -> Result<CommandResult, ExecuteError>;
}

/// Converts a JSON result cell into a runtime [`Value`].
///
/// # Errors
///
/// Returns [`CompileError::UnsupportedValue`] for objects and for arrays
/// holding anything but numbers.
pub fn value_from_json(cell: &serde_json::Value) -> Result<Value, CompileError> {
    use serde_json::Value as Json;

    match cell {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(CompileError::UnsupportedValue(n.to_string()))
            }
        }
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Json::Number(n) => {
                        let f = n
                            .as_f64()
                            .ok_or_else(|| CompileError::UnsupportedValue(n.to_string()))?;
                        out.push(f);
                    }
                    other => {
                        return Err(CompileError::UnsupportedValue(other.to_string()));
                    }
                }
            }
            Ok(Value::Vector(out))
        }
        Json::Object(_) => Err(CompileError::UnsupportedValue(cell.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_cells() {
        assert_eq!(value_from_json(&json!(null)).unwrap(), Value::Null);
        assert_eq!(value_from_json(&json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(value_from_json(&json!(42)).unwrap(), Value::Int(42));
        assert_eq!(value_from_json(&json!(1.5)).unwrap(), Value::Float(1.5));
        assert_eq!(
            value_from_json(&json!("alice")).unwrap(),
            Value::Str("alice".into())
        );
    }

    #[test]
    fn test_vector_cell() {
        assert_eq!(
            value_from_json(&json!([0.1, 0.2])).unwrap(),
            Value::Vector(vec![0.1, 0.2])
        );
    }

    #[test]
    fn test_unsupported_cells() {
        assert!(matches!(
            value_from_json(&json!({"a": 1})),
            Err(CompileError::UnsupportedValue(_))
        ));
        assert!(matches!(
            value_from_json(&json!(["a", "b"])),
            Err(CompileError::UnsupportedValue(_))
        ));
    }
}
