//! Error types for the store

use crate::schema::TableInfo;
use persist_model::CompileError;
use persist_sql::Schema;
use persist_value::DecodeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a store could not be opened. A failed open leaves the database
/// as it was.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Table {table} exists with an incompatible structure: found {on_disk:?}, declared {declared:?}")]
    IncompatibleSchema {
        table: String,
        on_disk: Box<TableInfo>,
        declared: Box<Schema>,
    },

    #[error("Invalid model: {0}")]
    Compile(#[from] CompileError),

    #[error("Storage engine error: {0}")]
    Unknown(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Insert into {table} is missing required properties: {missing:?}")]
    InsufficientInsert {
        table: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("Storage engine error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}
