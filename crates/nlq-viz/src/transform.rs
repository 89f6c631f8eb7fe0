//! Result-to-visualization transformation
//!
//! Maps raw row tuples into the [`VizData`] shape based on the declared
//! chart intent. Grouping charts aggregate by the category column; line
//! charts preserve row order untouched.

use std::collections::HashMap;

use nlq_ir::ResultSet;
use thiserror::Error;

use crate::{ChartKind, ChartSpec, VizData, NULL_CATEGORY};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Chart column index {index} out of range for result width {width}")]
    ColumnIndexOutOfRange { index: usize, width: usize },

    #[error("Line charts require a value column")]
    MissingValueColumn,
}

/// Build chart data from an executed result set
pub fn transform(result: &ResultSet, spec: &ChartSpec) -> Result<VizData, TransformError> {
    let width = result.width();
    let check = |index: usize| {
        if index >= width {
            Err(TransformError::ColumnIndexOutOfRange { index, width })
        } else {
            Ok(())
        }
    };

    check(spec.category)?;
    if let Some(value) = spec.value {
        check(value)?;
    }

    let data = match spec.kind {
        ChartKind::Line => {
            let value = spec.value.ok_or(TransformError::MissingValueColumn)?;
            let mut categories = Vec::with_capacity(result.rows.len());
            let mut values = Vec::with_capacity(result.rows.len());
            for row in &result.rows {
                categories.push(cell_label(row.get(spec.category)));
                values.push(cell_number(row.get(value)));
            }
            VizData { categories, values }
        }
        ChartKind::Pie | ChartKind::Bar | ChartKind::Histogram => {
            group_by_category(result, spec)
        }
    };

    tracing::debug!(kind = ?spec.kind, points = data.len(), "transformed result set");
    Ok(data)
}

/// Group rows by the category cell, counting occurrences or summing the
/// value column. First-seen category order is preserved.
fn group_by_category(result: &ResultSet, spec: &ChartSpec) -> VizData {
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut categories = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for row in &result.rows {
        let label = cell_label(row.get(spec.category));
        let contribution = match spec.value {
            Some(index) => cell_number(row.get(index)),
            None => 1.0,
        };

        let i = match slot.get(&label).copied() {
            Some(i) => i,
            None => {
                let i = categories.len();
                slot.insert(label.clone(), i);
                categories.push(label);
                values.push(0.0);
                i
            }
        };
        values[i] += contribution;
    }

    VizData { categories, values }
}

fn cell_label(cell: Option<&serde_json::Value>) -> String {
    match cell {
        None | Some(serde_json::Value::Null) => NULL_CATEGORY.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// NULL values contribute zero, not an error
fn cell_number(cell: Option<&serde_json::Value>) -> f64 {
    cell.and_then(|v| v.as_f64()).unwrap_or(0.0)
}
