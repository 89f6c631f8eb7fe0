//! Validation layer for structured queries
//!
//! Resolves every table/column reference against the schema catalog and
//! checks operator/type compatibility. Success yields a [`ValidQuery`]
//! witness; the SQL compiler accepts nothing else, so unvalidated IR can
//! never reach SQL generation.

use thiserror::Error;

use crate::catalog::SchemaCatalog;
use crate::{
    AggregateFn, AggregateSpec, ColumnDescriptor, ColumnType, FilterClause, FilterOp, Operation,
    QueryIR, TableDescriptor, Value,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Table not found: {table}")]
    UnknownTable { table: String },

    #[error("Column not found in table '{table}': {column}")]
    UnknownColumn { table: String, column: String },

    #[error("Operator {op} is not valid for column '{column}' of type {column_type:?}")]
    OperatorTypeMismatch {
        op: String,
        column: String,
        column_type: ColumnType,
    },

    #[error("Aggregate operation requires a target column")]
    EmptyAggregateTarget,

    #[error("IN filter on column '{column}' requires a non-empty value list")]
    EmptyInList { column: String },
}

/// Normalized projection shape, fixed at validation time so compilation is
/// total over it.
#[derive(Debug, Clone)]
pub(crate) enum QueryShape {
    Select,
    Count,
    Aggregate(AggregateSpec),
}

/// A query that has passed catalog validation.
///
/// Fields are private: the only constructor is [`validate`].
#[derive(Debug, Clone)]
pub struct ValidQuery {
    ir: QueryIR,
    table: TableDescriptor,
    shape: QueryShape,
}

impl ValidQuery {
    pub fn ir(&self) -> &QueryIR {
        &self.ir
    }

    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    pub(crate) fn shape(&self) -> &QueryShape {
        &self.shape
    }
}

/// Validate a structured query against the catalog
pub fn validate(ir: &QueryIR, catalog: &SchemaCatalog) -> Result<ValidQuery, ValidationError> {
    let table = catalog
        .table(&ir.table)
        .ok_or_else(|| ValidationError::UnknownTable {
            table: ir.table.clone(),
        })?;

    for column in &ir.columns {
        resolve_column(&table, column)?;
    }

    for clause in &ir.filters {
        check_filter(&table, clause)?;
    }

    if let Some(order) = &ir.order_by {
        resolve_column(&table, &order.column)?;
    }

    let shape = match ir.operation {
        Operation::Select => QueryShape::Select,
        Operation::Count => QueryShape::Count,
        Operation::Aggregate => {
            let agg = ir
                .aggregate
                .as_ref()
                .ok_or(ValidationError::EmptyAggregateTarget)?;
            let column = resolve_column(&table, &agg.column)?;
            if matches!(agg.func, AggregateFn::Sum | AggregateFn::Avg)
                && !column.column_type.is_numeric()
            {
                return Err(ValidationError::OperatorTypeMismatch {
                    op: agg.func.sql_name().to_string(),
                    column: agg.column.clone(),
                    column_type: column.column_type,
                });
            }
            QueryShape::Aggregate(agg.clone())
        }
    };

    Ok(ValidQuery {
        ir: ir.clone(),
        table,
        shape,
    })
}

fn resolve_column<'a>(
    table: &'a TableDescriptor,
    name: &str,
) -> Result<&'a ColumnDescriptor, ValidationError> {
    table
        .column(name)
        .ok_or_else(|| ValidationError::UnknownColumn {
            table: table.name.clone(),
            column: name.to_string(),
        })
}

fn check_filter(table: &TableDescriptor, clause: &FilterClause) -> Result<(), ValidationError> {
    let column = resolve_column(table, &clause.column)?;

    let mismatch = || ValidationError::OperatorTypeMismatch {
        op: clause.op.sql_symbol().to_string(),
        column: clause.column.clone(),
        column_type: column.column_type,
    };

    match clause.op {
        FilterOp::Like => {
            if column.column_type != ColumnType::Text {
                return Err(mismatch());
            }
        }
        FilterOp::Gt | FilterOp::Lt | FilterOp::Gte | FilterOp::Lte => {
            if !column.column_type.is_ordered() {
                return Err(mismatch());
            }
        }
        FilterOp::In => match &clause.value {
            Value::List(items) if items.is_empty() => {
                return Err(ValidationError::EmptyInList {
                    column: clause.column.clone(),
                });
            }
            Value::List(_) => {}
            _ => return Err(mismatch()),
        },
        FilterOp::Eq | FilterOp::Neq => {}
    }

    // A value list is only meaningful behind IN.
    if clause.op != FilterOp::In && matches!(clause.value, Value::List(_)) {
        return Err(mismatch());
    }

    Ok(())
}
