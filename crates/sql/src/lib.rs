//! Relational IR for the persistence layer
//!
//! This crate provides:
//! - Expressions, queries and mutation statements as plain data
//! - A canonical rendering into statement text with positional placeholders
//! - Table schemas and the compatibility check applied when a store opens
//! - Change-impact analysis deciding which mutations can alter a query

mod affected;
mod error;
mod render;
mod types;

pub use affected::affected;
pub use error::{Error, Result};
pub use persist_value::{DataType, Value};
pub use render::{Sql, quote};
pub use types::{
    Action, BinaryOperator, Column, ColumnDef, Delete, Direction, Expression, Function, Insert,
    Ordering, Query, ResultColumn, Schema, UnaryOperator, Update, is_compatible,
};
