//! DuckDB executor for compiled NLQ queries

use duckdb::{params_from_iter, types::Value as DuckValue, Config, Connection, Result as DuckResult};
use nlq_ir::{CompiledQuery, QueryParam, ResultSet};
use thiserror::Error;

mod catalog;
pub use catalog::{introspect, DuckCatalogSource};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Row budget exceeded: {0}")]
    RowBudget(String),
}

/// Per-request execution limits
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionBudget {
    pub max_rows: Option<u64>,
}

pub struct DuckExecutor {
    conn: Connection,
}

impl DuckExecutor {
    pub fn new() -> DuckResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<std::path::Path>>(path: P) -> DuckResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open a database file without write capability. The IR has no write
    /// variants, so the pipeline never needs more than this.
    pub fn open_read_only<P: AsRef<std::path::Path>>(path: P) -> DuckResult<Self> {
        let config = Config::default().access_mode(duckdb::AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(path, config)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Execute a compiled query, binding its parameters positionally
    pub fn execute(
        &self,
        query: &CompiledQuery,
        budget: Option<ExecutionBudget>,
    ) -> Result<ResultSet, ExecutionError> {
        tracing::debug!(sql = %query.sql, params = query.params.len(), "executing compiled query");

        let mut stmt = self.conn.prepare(&query.sql)?;

        // Extract column names before executing
        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                stmt.column_name(i)
                    .unwrap_or(&"unknown".to_string())
                    .to_string()
            })
            .collect();

        let args: Vec<DuckValue> = query.params.iter().map(param_value).collect();
        let mut rows = stmt.query(params_from_iter(args))?;

        let mut result_rows = Vec::new();
        let mut row_count: u64 = 0;

        while let Some(row) = rows.next()? {
            let mut json_row = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                json_row.push(cell_to_json(row.get_ref(i)?));
            }
            result_rows.push(json_row);
            row_count += 1;

            if let Some(ref budget) = budget {
                if let Some(max_rows) = budget.max_rows {
                    if row_count > max_rows {
                        return Err(ExecutionError::RowBudget(format!(
                            "Max rows ({}) exceeded",
                            max_rows
                        )));
                    }
                }
            }
        }

        Ok(ResultSet::new(columns, result_rows))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn param_value(param: &QueryParam) -> DuckValue {
    match param {
        QueryParam::Null => DuckValue::Null,
        QueryParam::Bool(b) => DuckValue::Boolean(*b),
        QueryParam::Int(i) => DuckValue::BigInt(*i),
        QueryParam::Float(f) => DuckValue::Double(*f),
        QueryParam::Text(s) => DuckValue::Text(s.clone()),
    }
}

fn cell_to_json(value_ref: duckdb::types::ValueRef<'_>) -> serde_json::Value {
    use duckdb::types::ValueRef;

    match value_ref {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(i) => serde_json::json!(i),
        ValueRef::SmallInt(i) => serde_json::json!(i),
        ValueRef::Int(i) => serde_json::json!(i),
        ValueRef::BigInt(i) => serde_json::json!(i),
        ValueRef::HugeInt(i) => serde_json::json!(i),
        ValueRef::UTinyInt(i) => serde_json::json!(i),
        ValueRef::USmallInt(i) => serde_json::json!(i),
        ValueRef::UInt(i) => serde_json::json!(i),
        ValueRef::UBigInt(i) => serde_json::json!(i),
        ValueRef::Float(f) => serde_json::json!(f),
        ValueRef::Double(f) => serde_json::json!(f),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
        // TODO: decimal and temporal cells surface as null; map them once the
        // catalog type set grows beyond TEXT/INTEGER/REAL/BOOLEAN.
        _ => serde_json::Value::Null,
    }
}
