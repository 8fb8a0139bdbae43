//! Store configuration

use std::path::PathBuf;
use std::time::Duration;

/// Where the database lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// A private in-memory database, gone when the store is dropped
    Memory,
    /// A database file, created if missing
    File(PathBuf),
}

/// Configuration for a store's connection
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Database location
    pub location: Location,

    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Duration,

    /// Number of prepared statements kept per connection
    pub statement_cache_capacity: usize,

    /// Whether the engine enforces foreign key constraints
    pub foreign_keys: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: Location::Memory,
            busy_timeout: Duration::from_secs(5),
            statement_cache_capacity: 64,
            foreign_keys: true,
        }
    }
}

impl StoreConfig {
    /// Create a config for a database file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            ..Default::default()
        }
    }

    /// In-memory database with a small statement cache
    pub fn for_testing() -> Self {
        Self {
            location: Location::Memory,
            busy_timeout: Duration::from_millis(100),
            statement_cache_capacity: 8,
            foreign_keys: true,
        }
    }

    /// Set busy timeout
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set prepared statement cache capacity
    pub fn with_statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }

    /// Enable or disable foreign key enforcement
    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}
