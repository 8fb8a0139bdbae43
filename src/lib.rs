//! Typed, reactive persistence over SQLite
//!
//! Models are described once by static [`Entity`] tables. Queries,
//! predicates and assignments are built from typed key paths and compiled
//! into a small relational IR, which the [`Store`] executes. Every mutation
//! is published on an ordered action log; observed queries refetch only when
//! an action can change their results.
//!
//! This crate re-exports the public surface of its members: model
//! description and the typed compiler from `persist-model`, the store and
//! its errors from `persist-store`, and values from `persist-value`. The
//! IR itself is available under [`sql`].

pub use persist_model::{
    CompileError, DefaultValue, Entity, Expr, IntoExpr, KeyPath, Model, Numeric, Predicate,
    Projection, Property, PropertyKind, Query, Row, Selection, SortDescriptor, ValueSet, max, min,
    now,
};
pub use persist_store::{
    ColumnInfo, Error, Location, Observation, OpenError, Result, Store, StoreConfig, TableInfo,
};
pub use persist_value::{DataType, DecodeError, Field, Value};

/// The relational IR and change-impact analysis
pub mod sql {
    pub use persist_sql::*;
}
