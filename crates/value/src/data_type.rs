//! Column storage classes

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Real,
    Text,
    Blob,
}

impl DataType {
    /// Parse a declared column type using the engine's affinity rules.
    ///
    /// Returns `None` for declarations that map to no single storage class
    /// (e.g. `NUMERIC` or an empty declaration).
    pub fn from_declared(declared: &str) -> Option<Self> {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.contains("INT") {
            Some(DataType::Integer)
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Some(DataType::Text)
        } else if upper.contains("BLOB") {
            Some(DataType::Blob)
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Some(DataType::Real)
        } else {
            None
        }
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Text => "TEXT",
            DataType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
