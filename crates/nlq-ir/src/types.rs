//! Column and table descriptors used by the schema catalog

use serde::{Deserialize, Serialize};

/// Declared type of a stored column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Boolean,
}

impl ColumnType {
    /// Numeric types that aggregate functions like sum/avg accept
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }

    /// Types with a total order usable by range operators
    pub fn is_ordered(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }

    /// Map a store-declared type name (e.g. `VARCHAR`, `BIGINT`) onto the
    /// closed IR type set. Unrecognized declarations fall back to `Text`.
    pub fn from_sql_type(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        match upper.as_str() {
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" | "HUGEINT" | "UBIGINT"
            | "UINTEGER" | "USMALLINT" | "UTINYINT" => ColumnType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" | "DECIMAL" | "NUMERIC" => ColumnType::Real,
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            _ if upper.starts_with("DECIMAL") => ColumnType::Real,
            _ => ColumnType::Text,
        }
    }
}

/// Immutable description of a single column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

/// Immutable description of a table: name plus ordered columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
