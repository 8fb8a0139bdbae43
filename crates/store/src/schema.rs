//! Reconciling declared tables with the database

use crate::error::OpenError;
use persist_model::Entity;
use persist_sql::{ColumnDef, DataType, Schema, is_compatible, quote};
use rusqlite::Connection;

/// A column as `PRAGMA table_info` reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// The declared type, verbatim.
    pub declared_type: String,
    pub nullable: bool,
    /// Position within the primary key, 0 if not part of it.
    pub primary_key: u32,
}

/// The structure of a table as it exists in the database. Unlike a
/// [`Schema`], this can describe tables no model could declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The equivalent schema, or `None` when a column type maps to no
    /// storage class or the key layout is not one a schema allows
    /// (composite or nullable keys).
    pub fn to_schema(&self) -> Option<Schema> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for info in &self.columns {
            let data_type = DataType::from_declared(&info.declared_type)?;
            let column = ColumnDef::new(info.name.clone(), data_type);
            let column = if info.primary_key > 0 {
                column.primary_key()
            } else {
                column
            };
            columns.push(column.nullable(info.nullable));
        }
        Schema::new(self.table.clone(), columns).ok()
    }

    /// Whether this table can be adopted for `declared`.
    pub fn is_compatible_with(&self, declared: &Schema) -> bool {
        self.to_schema()
            .is_some_and(|on_disk| is_compatible(&on_disk, declared))
    }
}

/// Reads the structure of `table` as it exists in the database.
pub(crate) fn read_table(conn: &Connection, table: &str) -> rusqlite::Result<Option<TableInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get("name")?,
                declared_type: row.get("type")?,
                nullable: !row.get::<_, bool>("notnull")?,
                primary_key: row.get("pk")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if columns.is_empty() {
        return Ok(None);
    }
    Ok(Some(TableInfo {
        table: table.to_string(),
        columns,
    }))
}

/// Creates the tables of `entities` that don't exist yet and checks that the
/// rest match their declarations.
pub(crate) fn ensure_tables(conn: &Connection, entities: &[&'static Entity]) -> Result<(), OpenError> {
    for entity in entities {
        let declared = entity.schema()?;
        match read_table(conn, &declared.table)? {
            None => {
                let sql = declared.create_sql();
                tracing::info!(table = %declared.table, sql = %sql, "Creating table");
                conn.execute(&sql, [])?;
            }
            Some(on_disk) if on_disk.is_compatible_with(&declared) => {
                tracing::debug!(table = %declared.table, "Table matches declaration");
            }
            Some(on_disk) => {
                tracing::warn!(
                    table = %declared.table,
                    on_disk = ?on_disk.columns,
                    declared = ?declared.columns,
                    "Table on disk is incompatible with its declaration"
                );
                return Err(OpenError::IncompatibleSchema {
                    table: declared.table.clone(),
                    on_disk: Box::new(on_disk),
                    declared: Box::new(declared),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author_schema() -> Schema {
        Schema::new(
            "Author",
            vec![
                ColumnDef::new("id", DataType::Integer).primary_key(),
                ColumnDef::new("name", DataType::Text),
                ColumnDef::new("rating", DataType::Real).nullable(true),
                ColumnDef::new("portrait", DataType::Blob).nullable(true),
            ],
        )
        .unwrap()
    }

    fn table(sql: &str) -> TableInfo {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(sql, []).unwrap();
        read_table(&conn, "Author").unwrap().unwrap()
    }

    #[test]
    fn test_missing_table_reads_as_none() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(read_table(&conn, "Author").unwrap().is_none());
    }

    #[test]
    fn test_created_table_reads_back_equal() {
        let schema = author_schema();
        let on_disk = table(&schema.create_sql());

        assert_eq!(on_disk.to_schema(), Some(schema.clone()));
        assert!(on_disk.is_compatible_with(&schema));
        assert_eq!(on_disk.column("id").unwrap().primary_key, 1);
    }

    #[test]
    fn test_unknown_column_type_is_incompatible() {
        let on_disk = table(
            r#"CREATE TABLE "Author" ("id" INTEGER NOT NULL PRIMARY KEY, "name" TEXT NOT NULL, "rating" NUMERIC, "portrait" BLOB)"#,
        );
        assert_eq!(on_disk.column("rating").unwrap().declared_type, "NUMERIC");
        assert!(on_disk.to_schema().is_none());
        assert!(!on_disk.is_compatible_with(&author_schema()));
    }

    #[test]
    fn test_nullable_key_is_incompatible() {
        let on_disk = table(
            r#"CREATE TABLE "Author" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL, "rating" REAL, "portrait" BLOB)"#,
        );
        assert!(on_disk.column("id").unwrap().nullable);
        assert!(!on_disk.is_compatible_with(&author_schema()));
    }

    #[test]
    fn test_composite_key_is_incompatible() {
        let on_disk = table(
            r#"CREATE TABLE "Author" ("id" INTEGER NOT NULL, "name" TEXT NOT NULL, "rating" REAL, "portrait" BLOB, PRIMARY KEY ("id", "name"))"#,
        );
        assert_eq!(on_disk.column("name").unwrap().primary_key, 2);
        assert!(on_disk.to_schema().is_none());
        assert!(!on_disk.is_compatible_with(&author_schema()));
    }
}
