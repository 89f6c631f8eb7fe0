//! Result shape produced by the query executor

use serde::{Deserialize, Serialize};

/// Ordered rows plus ordered column names, produced once per executed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// Number of columns per row
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}
