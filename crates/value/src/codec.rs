//! Conversions between host types and stored values
//!
//! Every host type that fits in a single column implements [`Field`].

use crate::data_type::DataType;
use crate::types::Value;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl DecodeError {
    fn mismatch(expected: &'static str, found: &Value) -> Self {
        DecodeError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }
}

/// A host type stored in exactly one column
pub trait Field: Sized {
    /// Storage class of the column holding this type
    const DATA_TYPE: DataType;

    /// Whether an absent value is representable
    const NULLABLE: bool = false;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

impl Field for i64 {
    const DATA_TYPE: DataType = DataType::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(DecodeError::mismatch("integer", &other)),
        }
    }
}

impl Field for i32 {
    const DATA_TYPE: DataType = DataType::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }

    fn from_value(value: Value) -> Result<Self> {
        let i = i64::from_value(value)?;
        i32::try_from(i).map_err(|_| DecodeError::InvalidValue(format!("{} out of range for i32", i)))
    }
}

impl Field for bool {
    const DATA_TYPE: DataType = DataType::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(i64::from_value(value)? != 0)
    }
}

impl Field for f64 {
    const DATA_TYPE: DataType = DataType::Real;

    fn into_value(self) -> Value {
        Value::Real(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(r),
            // REAL columns hand back integral values as integers
            Value::Integer(i) => Ok(i as f64),
            other => Err(DecodeError::mismatch("real", &other)),
        }
    }
}

impl Field for String {
    const DATA_TYPE: DataType = DataType::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(DecodeError::mismatch("text", &other)),
        }
    }
}

impl Field for Vec<u8> {
    const DATA_TYPE: DataType = DataType::Blob;

    fn into_value(self) -> Value {
        Value::Blob(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b),
            other => Err(DecodeError::mismatch("blob", &other)),
        }
    }
}

/// Stored as real seconds since the Unix epoch, microsecond precision
impl Field for DateTime<Utc> {
    const DATA_TYPE: DataType = DataType::Real;

    fn into_value(self) -> Value {
        Value::Real(self.timestamp_micros() as f64 / 1_000_000.0)
    }

    fn from_value(value: Value) -> Result<Self> {
        let seconds = f64::from_value(value)?;
        let micros = (seconds * 1_000_000.0).round() as i64;
        DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| DecodeError::InvalidValue(format!("timestamp {} out of range", seconds)))
    }
}

/// Stored as hyphenated text
impl Field for Uuid {
    const DATA_TYPE: DataType = DataType::Text;

    fn into_value(self) -> Value {
        Value::Text(self.hyphenated().to_string())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => {
                Uuid::parse_str(&s).map_err(|e| DecodeError::InvalidValue(e.to_string()))
            }
            Value::Blob(b) => {
                Uuid::from_slice(&b).map_err(|e| DecodeError::InvalidValue(e.to_string()))
            }
            other => Err(DecodeError::mismatch("uuid", &other)),
        }
    }
}

impl<T: Field> Field for Option<T> {
    const DATA_TYPE: DataType = T::DATA_TYPE;
    const NULLABLE: bool = true;

    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
