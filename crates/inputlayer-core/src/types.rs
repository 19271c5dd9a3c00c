//! The InputLayer type system: storage types and runtime literal values.
//!
//! Storage types are the sealed set of tags a relation column can be
//! declared with. Values are the runtime literals that get encoded into
//! Datalog text.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};

use crate::error::CompileError;

/// Datalog storage types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Unix milliseconds timestamp.
    Timestamp,
    /// Float32 vector, optionally with a fixed dimension.
    Vector(Option<u32>),
    /// Int8 quantized vector, optionally with a fixed dimension.
    VectorInt8(Option<u32>),
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Vector(None) => f.write_str("vector"),
            Self::Vector(Some(dim)) => write!(f, "vector[{dim}]"),
            Self::VectorInt8(None) => f.write_str("vector_int8"),
            Self::VectorInt8(Some(dim)) => write!(f, "vector_int8[{dim}]"),
        }
    }
}

impl FromStr for StorageType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "bool" => Ok(Self::Bool),
            "timestamp" => Ok(Self::Timestamp),
            "vector" => Ok(Self::Vector(None)),
            "vector_int8" => Ok(Self::VectorInt8(None)),
            _ => parse_dimensioned(s).ok_or_else(|| CompileError::UnsupportedType(s.to_string())),
        }
    }
}

fn parse_dimensioned(s: &str) -> Option<StorageType> {
    let body = s.strip_suffix(']')?;
    if let Some(dim) = body.strip_prefix("vector[") {
        let dim: u32 = dim.parse().ok()?;
        return (dim > 0).then_some(StorageType::Vector(Some(dim)));
    }
    if let Some(dim) = body.strip_prefix("vector_int8[") {
        let dim: u32 = dim.parse().ok()?;
        return (dim > 0).then_some(StorageType::VectorInt8(Some(dim)));
    }
    None
}

/// Timestamp as Unix milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time as a `Timestamp`.
    ///
    /// # Panics
    ///
    /// Panics if the system clock is before the Unix epoch.
    #[must_use]
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_millis();
        Self(ms as i64)
    }

    /// Converts a `chrono` datetime to a `Timestamp`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    /// Converts to a UTC datetime. Returns `None` when out of chrono's
    /// representable range.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

/// Float vector value. Use a `#[column(dim = N)]` attribute on the field
/// declaration to give the column a fixed dimension.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector(pub Vec<f64>);

impl Vector {
    /// Vector dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f64>> for Vector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

/// Int8 quantized vector value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorInt8(pub Vec<i8>);

impl From<Vec<i8>> for VectorInt8 {
    fn from(v: Vec<i8>) -> Self {
        Self(v)
    }
}

/// A runtime literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// Float vector literal.
    Vector(Vec<f64>),
    /// Int8 vector literal.
    VectorInt8(Vec<i8>),
    /// Timestamp literal (Unix milliseconds).
    Timestamp(i64),
}

impl Value {
    /// Encodes this value to its Datalog literal form.
    ///
    /// Strings are double-quoted with backslashes doubled and embedded
    /// double quotes escaped; vectors render as bracketed comma lists;
    /// timestamps render as bare millisecond integers.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Null => String::from("null"),
            Self::Bool(true) => String::from("true"),
            Self::Bool(false) => String::from("false"),
            Self::Int(n) => n.to_string(),
            // {:?} is the shortest round-trippable form and keeps the
            // trailing ".0" on integral floats.
            Self::Float(f) => format!("{f:?}"),
            Self::Str(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
            Self::Vector(v) => {
                let inner: Vec<String> = v.iter().map(|f| format!("{f:?}")).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::VectorInt8(v) => {
                let inner: Vec<String> = v.iter().map(ToString::to_string).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Timestamp(ms) => ms.to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self {
        Self::Vector(v.0)
    }
}

impl From<VectorInt8> for Value {
    fn from(v: VectorInt8) -> Self {
        Self::VectorInt8(v.0)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v.0)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_names() {
        assert_eq!(StorageType::Int.to_string(), "int");
        assert_eq!(StorageType::Float.to_string(), "float");
        assert_eq!(StorageType::String.to_string(), "string");
        assert_eq!(StorageType::Bool.to_string(), "bool");
        assert_eq!(StorageType::Timestamp.to_string(), "timestamp");
        assert_eq!(StorageType::Vector(None).to_string(), "vector");
        assert_eq!(StorageType::Vector(Some(128)).to_string(), "vector[128]");
        assert_eq!(StorageType::VectorInt8(None).to_string(), "vector_int8");
        assert_eq!(
            StorageType::VectorInt8(Some(64)).to_string(),
            "vector_int8[64]"
        );
    }

    #[test]
    fn test_storage_type_parse_round_trip() {
        for tp in [
            StorageType::Int,
            StorageType::Float,
            StorageType::String,
            StorageType::Bool,
            StorageType::Timestamp,
            StorageType::Vector(None),
            StorageType::Vector(Some(1)),
            StorageType::Vector(Some(768)),
            StorageType::VectorInt8(Some(128)),
        ] {
            assert_eq!(tp.to_string().parse::<StorageType>().unwrap(), tp);
        }
    }

    #[test]
    fn test_storage_type_parse_rejects_unknown() {
        assert!(matches!(
            "blob".parse::<StorageType>(),
            Err(CompileError::UnsupportedType(_))
        ));
        assert!("vector[0]".parse::<StorageType>().is_err());
        assert!("vector[abc]".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_encode_int() {
        assert_eq!(Value::Int(42).encode(), "42");
        assert_eq!(Value::Int(-5).encode(), "-5");
    }

    #[test]
    fn test_encode_float() {
        assert_eq!(Value::Float(3.14).encode(), "3.14");
        assert_eq!(Value::Float(120_000.0).encode(), "120000.0");
    }

    #[test]
    fn test_encode_bool_and_null() {
        assert_eq!(Value::Bool(true).encode(), "true");
        assert_eq!(Value::Bool(false).encode(), "false");
        assert_eq!(Value::Null.encode(), "null");
    }

    #[test]
    fn test_encode_string() {
        assert_eq!(Value::from("hello").encode(), "\"hello\"");
    }

    #[test]
    fn test_encode_string_escapes() {
        assert_eq!(Value::from("say \"hi\"").encode(), "\"say \\\"hi\\\"\"");
        assert_eq!(Value::from("a\\b").encode(), "\"a\\\\b\"");
    }

    #[test]
    fn test_encode_vector() {
        assert_eq!(
            Value::Vector(vec![1.0, 2.0, 3.0]).encode(),
            "[1.0, 2.0, 3.0]"
        );
        assert_eq!(Value::Vector(vec![]).encode(), "[]");
        assert_eq!(Value::Vector(vec![0.5]).encode(), "[0.5]");
    }

    #[test]
    fn test_encode_vector_int8() {
        assert_eq!(Value::VectorInt8(vec![1, -2, 3]).encode(), "[1, -2, 3]");
    }

    #[test]
    fn test_encode_timestamp() {
        assert_eq!(
            Value::from(Timestamp(1_704_067_200_000)).encode(),
            "1704067200000"
        );
    }

    #[test]
    fn test_timestamp_datetime_round_trip() {
        let ts = Timestamp(1_704_067_200_000);
        let dt = ts.to_datetime().unwrap();
        assert_eq!(Timestamp::from_datetime(dt), ts);
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7_i64)), Value::Int(7));
    }
}
