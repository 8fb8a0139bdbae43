//! Persist Model - typed models compiled into the relational IR
//!
//! This crate provides:
//! - Static model descriptors and the table schema derived from them
//! - Key paths that cross to-one relationships through implicit joins
//! - Typed expressions, predicates, sort keys and queries
//! - Projections and the rows they decode
//! - Assignment sets compiled into inserts and updates

pub mod entity;
pub mod error;
pub mod expr;
pub mod path;
pub mod query;
pub mod value_set;

pub use entity::{DefaultValue, Entity, Model, Property, PropertyKind};
pub use error::{CompileError, Result};
pub use expr::{Expr, IntoExpr, Numeric, Predicate, max, min, now};
pub use path::KeyPath;
pub use query::{Projection, Query, Row, Selection, SortDescriptor};
pub use value_set::{ValueSet, delete};
