//! Schema catalog - authoritative table/column metadata
//!
//! The catalog is a read model: loaded once at startup from a
//! [`CatalogSource`], then shared across request pipelines. Reads are
//! lock-free in spirit (shared `RwLock` guard); [`SchemaCatalog::refresh`]
//! takes the write lock so readers always observe a complete table set.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use thiserror::Error;

use crate::TableDescriptor;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog source error: {0}")]
    Source(String),

    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },
}

/// Pull-based supplier of table descriptors (store introspection lives
/// behind this seam, outside the pure core).
pub trait CatalogSource {
    fn load_tables(&self) -> Result<Vec<TableDescriptor>, CatalogError>;
}

/// Mapping from table name to descriptor; safe for concurrent readers
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    tables: RwLock<HashMap<String, TableDescriptor>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors, enforcing unique column names
    pub fn from_tables(tables: Vec<TableDescriptor>) -> Result<Self, CatalogError> {
        let catalog = Self::new();
        catalog.install(tables)?;
        Ok(catalog)
    }

    /// Load a fresh catalog from a source
    pub fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        Self::from_tables(source.load_tables()?)
    }

    /// Re-pull descriptors from the source and swap the table set in one
    /// write-locked step. Readers see either the old or the new catalog.
    pub fn refresh(&self, source: &dyn CatalogSource) -> Result<(), CatalogError> {
        let tables = source.load_tables()?;
        self.install(tables)
    }

    fn install(&self, tables: Vec<TableDescriptor>) -> Result<(), CatalogError> {
        let mut map = HashMap::with_capacity(tables.len());
        for table in tables {
            let mut seen = std::collections::HashSet::new();
            for column in &table.columns {
                if !seen.insert(column.name.clone()) {
                    return Err(CatalogError::DuplicateColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }
            map.insert(table.name.clone(), table);
        }

        let mut guard = self
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = map;
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<TableDescriptor> {
        self.read_guard().get(name).cloned()
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.read_guard().contains_key(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_guard().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of every descriptor, sorted by table name
    pub fn snapshot(&self) -> Vec<TableDescriptor> {
        let mut tables: Vec<TableDescriptor> = self.read_guard().values().cloned().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, HashMap<String, TableDescriptor>> {
        // A poisoned lock only means a panicking writer; the map itself is
        // always in a consistent state because install() swaps it whole.
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDescriptor, ColumnType};

    fn people_table() -> TableDescriptor {
        TableDescriptor::new(
            "people",
            vec![
                ColumnDescriptor {
                    name: "Last Name".to_string(),
                    column_type: ColumnType::Text,
                    nullable: true,
                },
                ColumnDescriptor {
                    name: "Sex".to_string(),
                    column_type: ColumnType::Text,
                    nullable: true,
                },
            ],
        )
    }

    struct FixedSource(Vec<TableDescriptor>);

    impl CatalogSource for FixedSource {
        fn load_tables(&self) -> Result<Vec<TableDescriptor>, CatalogError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_lookup_and_names() {
        let catalog = SchemaCatalog::from_tables(vec![people_table()]).unwrap();

        assert!(catalog.contains_table("people"));
        assert!(catalog.table("unknown").is_none());
        assert_eq!(catalog.table_names(), vec!["people".to_string()]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = people_table();
        table.columns.push(ColumnDescriptor {
            name: "Sex".to_string(),
            column_type: ColumnType::Text,
            nullable: true,
        });

        let err = SchemaCatalog::from_tables(vec![table]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_refresh_swaps_table_set() {
        let catalog = SchemaCatalog::from_tables(vec![people_table()]).unwrap();

        let replacement = TableDescriptor::new(
            "orders",
            vec![ColumnDescriptor {
                name: "id".to_string(),
                column_type: ColumnType::Integer,
                nullable: false,
            }],
        );
        catalog.refresh(&FixedSource(vec![replacement])).unwrap();

        assert!(!catalog.contains_table("people"));
        assert!(catalog.contains_table("orders"));
    }
}
