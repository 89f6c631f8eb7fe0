//! NLQ Intermediate Representation (IR)
//!
//! Canonical JSON representation of the structured query a language model is
//! constrained to produce. The IR is deliberately closed: a fixed operation
//! set, flat conjunctive filters, and literal values that are always bound as
//! parameters. All types are deterministically serializable for provenance.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

mod types;
pub use types::*;

pub mod catalog;
pub use catalog::{CatalogError, CatalogSource, SchemaCatalog};

pub mod validate;
pub use validate::{validate, ValidQuery, ValidationError};

pub mod compile;
pub use compile::{compile, CompiledQuery, QueryParam};

mod result;
pub use result::ResultSet;

/// Operation kind of a structured query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Select,
    Count,
    Aggregate,
}

/// Aggregate functions accepted by the `Aggregate` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFn {
    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }
}

/// Aggregate call: function plus its target column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub func: AggregateFn,
    pub column: String,
}

/// Comparison operators usable in a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterOp {
    Eq,
    Neq,
    Like,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
}

impl FilterOp {
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Neq => "!=",
            FilterOp::Like => "LIKE",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }
}

/// One conjunct of the WHERE clause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Optional ordering directive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub desc: bool,
}

/// Top-level structured query
///
/// May be constructed with references that do not exist; [`validate`] is the
/// gate every instance must pass before compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryIR {
    pub operation: Operation,

    pub table: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregateSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl QueryIR {
    /// Calculate fingerprint (SHA-256) for provenance and request logging
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("IR should always serialize");
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Literal value carried by a filter clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smith_count_ir() -> QueryIR {
        QueryIR {
            operation: Operation::Count,
            table: "people".to_string(),
            columns: vec![],
            aggregate: None,
            filters: vec![FilterClause {
                column: "Last Name".to_string(),
                op: FilterOp::Like,
                value: Value::String("%Smith%".to_string()),
            }],
            order_by: None,
            limit: None,
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let ir1 = smith_count_ir();
        let ir2 = ir1.clone();

        assert_eq!(ir1.fingerprint(), ir2.fingerprint());
    }

    #[test]
    fn test_json_round_trip() {
        let ir = smith_count_ir();

        let json = serde_json::to_string(&ir).unwrap();
        let parsed: QueryIR = serde_json::from_str(&json).unwrap();

        assert_eq!(ir.fingerprint(), parsed.fingerprint());
    }

    #[test]
    fn test_model_shaped_json_deserializes() {
        // The exact shape an external model-output parser hands over.
        let json = r#"{
            "operation": "SELECT",
            "table": "people",
            "columns": ["First Name"],
            "filters": [
                {"column": "Sex", "op": "EQ", "value": "Male"},
                {"column": "Index", "op": "IN", "value": [1, 2, 3]}
            ],
            "order_by": {"column": "Date of birth", "desc": true},
            "limit": 5
        }"#;

        let ir: QueryIR = serde_json::from_str(json).unwrap();
        assert_eq!(ir.operation, Operation::Select);
        assert_eq!(ir.filters.len(), 2);
        assert!(matches!(ir.filters[1].value, Value::List(ref items) if items.len() == 3));
        assert_eq!(ir.limit, Some(5));
    }
}
