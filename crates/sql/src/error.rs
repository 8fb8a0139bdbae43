//! Error types for the relational IR

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Table name cannot be empty")]
    EmptyTableName,

    #[error("Column already exists: {table}.{column}")]
    DuplicateColumn { table: String, column: String },

    #[error("Table {0} can only have one primary key")]
    MultiplePrimaryKeys(String),

    #[error("Primary key {table}.{column} cannot be nullable")]
    NullablePrimaryKey { table: String, column: String },
}
