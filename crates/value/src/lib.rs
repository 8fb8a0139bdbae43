//! Persist Value - storage values for the persistence layer
//!
//! This crate provides:
//! - The closed [`Value`] variant stored in every column
//! - [`DataType`], the declared storage class of a column
//! - [`Field`], the conversion between host types and values

pub mod codec;
pub mod data_type;
pub mod types;

#[cfg(feature = "rusqlite")]
pub mod sqlite;

pub use codec::{DecodeError, Field, Result};
pub use data_type::DataType;
pub use types::Value;
