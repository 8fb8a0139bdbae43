//! Table schemas
//!
//! Tables can't change after they are created. There is no ALTER TABLE: a
//! table on disk either matches its declaration exactly or is rejected.

use crate::error::{Error, Result};
use crate::render::quote;
use persist_value::DataType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A table column.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct ColumnDef {
    /// Column name. Can't be empty.
    pub name: String,
    /// Column datatype.
    pub data_type: DataType,
    /// Whether the column allows null values. Not legal for primary keys.
    pub nullable: bool,
    /// Whether this is the primary key column.
    pub primary_key: bool,
}

impl ColumnDef {
    /// Creates a new non-null column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        ColumnDef {
            name: name.into(),
            data_type,
            nullable: false,
            primary_key: false,
        }
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    fn definition(&self) -> String {
        let mut sql = format!("{} {}", quote(&self.name), self.data_type.sql_name());
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        sql
    }
}

/// A table schema. Column order is irrelevant: two schemas are equal iff
/// their table names and column sets are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Schema {
    pub table: String,
    pub columns: BTreeSet<ColumnDef>,
}

impl Schema {
    /// Creates a new table schema.
    pub fn new(table: impl Into<String>, columns: impl IntoIterator<Item = ColumnDef>) -> Result<Self> {
        let table = table.into();
        if table.is_empty() {
            return Err(Error::EmptyTableName);
        }

        let mut names = BTreeSet::new();
        let mut set = BTreeSet::new();
        let mut primary_key: Option<String> = None;
        for column in columns {
            if !names.insert(column.name.clone()) {
                return Err(Error::DuplicateColumn {
                    table,
                    column: column.name,
                });
            }
            if column.primary_key {
                if column.nullable {
                    return Err(Error::NullablePrimaryKey {
                        table,
                        column: column.name,
                    });
                }
                if primary_key.replace(column.name.clone()).is_some() {
                    return Err(Error::MultiplePrimaryKeys(table));
                }
            }
            set.insert(column);
        }

        Ok(Schema {
            table,
            columns: set,
        })
    }

    /// Returns the column with the given name, if it exists.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// The CREATE TABLE statement, primary key first then columns by name.
    pub fn create_sql(&self) -> String {
        let mut columns: Vec<_> = self.columns.iter().collect();
        columns.sort_by(|a, b| (!a.primary_key, &a.name).cmp(&(!b.primary_key, &b.name)));
        let definitions: Vec<_> = columns.iter().map(|c| c.definition()).collect();
        format!(
            "CREATE TABLE {} ({})",
            quote(&self.table),
            definitions.join(", ")
        )
    }
}

/// Whether a table found on disk can be adopted for a declared schema.
pub fn is_compatible(on_disk: &Schema, declared: &Schema) -> bool {
    on_disk == declared
}
