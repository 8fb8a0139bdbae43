//! Persist Store - reactive persistence over SQLite
//!
//! This crate provides:
//! - Opening a database and reconciling tables with model declarations
//! - Inserts, updates and deletes applied in one total order
//! - One-shot fetches of projections
//! - Observations that refetch only when an applied action can change them

mod config;
mod error;
mod log;
mod schema;
mod store;

pub use config::{Location, StoreConfig};
pub use error::{Error, OpenError, Result};
pub use log::{ActionLog, LogEntry};
pub use schema::{ColumnInfo, TableInfo};
pub use store::{Observation, Store};
