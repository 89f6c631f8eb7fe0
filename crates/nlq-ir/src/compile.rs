//! Compiler - transforms validated IR into parameterized SQL
//!
//! Compilation is deterministic and total: it accepts only [`ValidQuery`],
//! so every identifier is already known-safe and every literal becomes a
//! bound parameter. No literal value is ever interpolated into SQL text.

use crate::validate::{QueryShape, ValidQuery};
use crate::{FilterOp, Value};

/// SQL template with positional placeholders plus its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Scalar parameter value bound to one `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Compile a validated query to DuckDB SQL
pub fn compile(query: &ValidQuery) -> CompiledQuery {
    let ir = query.ir();
    let mut params = Vec::new();

    let mut sql = match query.shape() {
        QueryShape::Select if ir.columns.is_empty() => "SELECT *".to_string(),
        QueryShape::Select => {
            let columns: Vec<String> = ir.columns.iter().map(|c| quote_ident(c)).collect();
            format!("SELECT {}", columns.join(", "))
        }
        QueryShape::Count => "SELECT COUNT(*)".to_string(),
        QueryShape::Aggregate(agg) => {
            format!("SELECT {}({})", agg.func.sql_name(), quote_ident(&agg.column))
        }
    };

    sql.push_str(" FROM ");
    sql.push_str(&quote_ident(&ir.table));

    if !ir.filters.is_empty() {
        let mut conjuncts = Vec::with_capacity(ir.filters.len());
        for clause in &ir.filters {
            match (clause.op, &clause.value) {
                (FilterOp::In, Value::List(items)) => {
                    let placeholders = vec!["?"; items.len()].join(", ");
                    conjuncts.push(format!(
                        "{} IN ({})",
                        quote_ident(&clause.column),
                        placeholders
                    ));
                    params.extend(items.iter().map(scalar_param));
                }
                (op, value) => {
                    conjuncts.push(format!(
                        "{} {} ?",
                        quote_ident(&clause.column),
                        op.sql_symbol()
                    ));
                    params.push(scalar_param(value));
                }
            }
        }
        sql.push_str(" WHERE ");
        sql.push_str(&conjuncts.join(" AND "));
    }

    // Aggregate forms produce a single row; ordering and limits only make
    // sense for row-returning selects.
    if matches!(query.shape(), QueryShape::Select) {
        if let Some(order) = &ir.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(&quote_ident(&order.column));
            sql.push_str(if order.desc { " DESC" } else { " ASC" });
        }
        if let Some(limit) = ir.limit {
            sql.push_str(" LIMIT ?");
            params.push(QueryParam::Int(limit));
        }
    }

    CompiledQuery { sql, params }
}

/// Quote an identifier for DuckDB, doubling any embedded quote
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn scalar_param(value: &Value) -> QueryParam {
    match value {
        Value::Null => QueryParam::Null,
        Value::Bool(b) => QueryParam::Bool(*b),
        Value::Int(i) => QueryParam::Int(*i),
        Value::Float(f) => QueryParam::Float(*f),
        Value::String(s) => QueryParam::Text(s.clone()),
        // Lists only reach the compiler behind an IN operator; validation
        // rejects them everywhere else.
        Value::List(_) => QueryParam::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SchemaCatalog;
    use crate::validate::validate;
    use crate::{
        AggregateFn, AggregateSpec, ColumnDescriptor, ColumnType, FilterClause, Operation, OrderBy,
        QueryIR, TableDescriptor,
    };

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::from_tables(vec![TableDescriptor::new(
            "people",
            vec![
                ColumnDescriptor {
                    name: "First Name".to_string(),
                    column_type: ColumnType::Text,
                    nullable: true,
                },
                ColumnDescriptor {
                    name: "Last Name".to_string(),
                    column_type: ColumnType::Text,
                    nullable: true,
                },
                ColumnDescriptor {
                    name: "Index".to_string(),
                    column_type: ColumnType::Integer,
                    nullable: false,
                },
            ],
        )])
        .unwrap()
    }

    fn compiled(ir: &QueryIR) -> CompiledQuery {
        compile(&validate(ir, &catalog()).unwrap())
    }

    #[test]
    fn test_count_with_like_filter() {
        let ir = QueryIR {
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
        };

        let query = compiled(&ir);
        assert_eq!(
            query.sql,
            r#"SELECT COUNT(*) FROM "people" WHERE "Last Name" LIKE ?"#
        );
        assert_eq!(query.params, vec![QueryParam::Text("%Smith%".to_string())]);
    }

    #[test]
    fn test_literals_never_inlined() {
        let ir = QueryIR {
            operation: Operation::Select,
            table: "people".to_string(),
            columns: vec!["First Name".to_string()],
            aggregate: None,
            filters: vec![
                FilterClause {
                    column: "Last Name".to_string(),
                    op: FilterOp::Eq,
                    value: Value::String("O'Brien".to_string()),
                },
                FilterClause {
                    column: "Index".to_string(),
                    op: FilterOp::Gt,
                    value: Value::Int(42),
                },
            ],
            order_by: None,
            limit: None,
        };

        let query = compiled(&ir);
        assert!(!query.sql.contains("O'Brien"));
        assert!(!query.sql.contains("42"));
        assert_eq!(query.sql.matches('?').count(), query.params.len());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let ir = QueryIR {
            operation: Operation::Select,
            table: "people".to_string(),
            columns: vec![],
            aggregate: None,
            filters: vec![FilterClause {
                column: "Index".to_string(),
                op: FilterOp::Lte,
                value: Value::Int(10),
            }],
            order_by: Some(OrderBy {
                column: "Last Name".to_string(),
                desc: false,
            }),
            limit: Some(5),
        };

        let first = compiled(&ir);
        let second = compiled(&ir);
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_order_and_parameterized_limit() {
        let ir = QueryIR {
            operation: Operation::Select,
            table: "people".to_string(),
            columns: vec!["First Name".to_string()],
            aggregate: None,
            filters: vec![],
            order_by: Some(OrderBy {
                column: "Index".to_string(),
                desc: true,
            }),
            limit: Some(3),
        };

        let query = compiled(&ir);
        assert_eq!(
            query.sql,
            r#"SELECT "First Name" FROM "people" ORDER BY "Index" DESC LIMIT ?"#
        );
        assert_eq!(query.params, vec![QueryParam::Int(3)]);
    }

    #[test]
    fn test_in_filter_expands_placeholders() {
        let ir = QueryIR {
            operation: Operation::Select,
            table: "people".to_string(),
            columns: vec![],
            aggregate: None,
            filters: vec![FilterClause {
                column: "Index".to_string(),
                op: FilterOp::In,
                value: Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            }],
            order_by: None,
            limit: None,
        };

        let query = compiled(&ir);
        assert_eq!(
            query.sql,
            r#"SELECT * FROM "people" WHERE "Index" IN (?, ?, ?)"#
        );
        assert_eq!(query.params.len(), 3);
    }

    #[test]
    fn test_aggregate_projection() {
        let ir = QueryIR {
            operation: Operation::Aggregate,
            table: "people".to_string(),
            columns: vec![],
            aggregate: Some(AggregateSpec {
                func: AggregateFn::Max,
                column: "Index".to_string(),
            }),
            filters: vec![],
            order_by: None,
            limit: None,
        };

        let query = compiled(&ir);
        assert_eq!(query.sql, r#"SELECT max("Index") FROM "people""#);
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_filters_preserve_declared_order() {
        let ir = QueryIR {
            operation: Operation::Select,
            table: "people".to_string(),
            columns: vec![],
            aggregate: None,
            filters: vec![
                FilterClause {
                    column: "First Name".to_string(),
                    op: FilterOp::Neq,
                    value: Value::String("Ann".to_string()),
                },
                FilterClause {
                    column: "Index".to_string(),
                    op: FilterOp::Lt,
                    value: Value::Int(100),
                },
            ],
            order_by: None,
            limit: None,
        };

        let query = compiled(&ir);
        assert_eq!(
            query.sql,
            r#"SELECT * FROM "people" WHERE "First Name" != ? AND "Index" < ?"#
        );
        assert_eq!(
            query.params,
            vec![
                QueryParam::Text("Ann".to_string()),
                QueryParam::Int(100)
            ]
        );
    }
}
