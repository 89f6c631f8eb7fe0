//! Catalog extraction from DuckDB's information_schema

use duckdb::{Connection, Result as DuckResult};
use nlq_ir::{CatalogError, CatalogSource, ColumnDescriptor, ColumnType, TableDescriptor};
use std::path::{Path, PathBuf};

use crate::DuckExecutor;

/// Read every table descriptor out of a live connection
pub fn introspect(conn: &Connection) -> Result<Vec<TableDescriptor>, CatalogError> {
    introspect_inner(conn).map_err(|e| CatalogError::Source(e.to_string()))
}

fn introspect_inner(conn: &Connection) -> DuckResult<Vec<TableDescriptor>> {
    let mut stmt = conn.prepare(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = 'main' ORDER BY table_name",
    )?;
    let table_names: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<DuckResult<Vec<_>>>()?;

    let mut tables = Vec::with_capacity(table_names.len());
    for table_name in table_names {
        tables.push(table_descriptor(conn, &table_name)?);
    }
    Ok(tables)
}

fn table_descriptor(conn: &Connection, table_name: &str) -> DuckResult<TableDescriptor> {
    let mut stmt = conn.prepare(
        "SELECT column_name, data_type, is_nullable \
         FROM information_schema.columns \
         WHERE table_name = ? \
         ORDER BY ordinal_position",
    )?;

    let columns: Vec<ColumnDescriptor> = stmt
        .query_map([table_name], |row| {
            let name: String = row.get(0)?;
            let data_type: String = row.get(1)?;
            let is_nullable: String = row.get(2)?;
            Ok(ColumnDescriptor {
                name,
                column_type: ColumnType::from_sql_type(&data_type),
                nullable: is_nullable == "YES",
            })
        })?
        .collect::<DuckResult<Vec<_>>>()?;

    Ok(TableDescriptor::new(table_name, columns))
}

/// Pull-based catalog source backed by a database file. Opens a fresh
/// connection per load so a refresh never contends with request executors.
pub struct DuckCatalogSource {
    db_path: PathBuf,
}

impl DuckCatalogSource {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for DuckCatalogSource {
    fn load_tables(&self) -> Result<Vec<TableDescriptor>, CatalogError> {
        let conn =
            Connection::open(&self.db_path).map_err(|e| CatalogError::Source(e.to_string()))?;
        introspect(&conn)
    }
}

/// An in-memory executor doubles as a catalog source for its own tables
impl CatalogSource for DuckExecutor {
    fn load_tables(&self) -> Result<Vec<TableDescriptor>, CatalogError> {
        introspect(self.connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_introspect_types_and_nullability() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"CREATE TABLE people (
                   "Index" INTEGER NOT NULL,
                   "Last Name" VARCHAR,
                   "Score" DOUBLE,
                   "Active" BOOLEAN
               );"#,
        )
        .unwrap();

        let tables = introspect(&conn).unwrap();
        assert_eq!(tables.len(), 1);

        let people = &tables[0];
        assert_eq!(people.name, "people");
        assert_eq!(people.columns.len(), 4);

        let index = people.column("Index").unwrap();
        assert_eq!(index.column_type, ColumnType::Integer);
        assert!(!index.nullable);

        assert_eq!(
            people.column("Last Name").unwrap().column_type,
            ColumnType::Text
        );
        assert_eq!(people.column("Score").unwrap().column_type, ColumnType::Real);
        assert_eq!(
            people.column("Active").unwrap().column_type,
            ColumnType::Boolean
        );
    }

    #[test]
    fn test_empty_database_yields_empty_catalog() {
        let conn = Connection::open_in_memory().unwrap();
        let tables = introspect(&conn).unwrap();
        assert!(tables.is_empty());
    }
}
