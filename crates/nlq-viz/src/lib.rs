//! NLQ visualization path
//!
//! Turns an executed [`ResultSet`](nlq_ir::ResultSet) into the canonical
//! [`VizData`] shape and renders synthesized plot scripts inside a
//! capability-restricted sandbox. The renderer never sees raw rows and the
//! script language cannot express anything beyond reading the injected data
//! and issuing plot calls.

use serde::{Deserialize, Serialize};

mod backend;
mod sandbox;
pub mod script;
mod transform;

pub use sandbox::{ArtifactFormat, RenderError, RenderResult, Sandbox};
pub use transform::{transform, TransformError};

/// Sentinel label for NULL category cells
pub const NULL_CATEGORY: &str = "<null>";

/// Supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChartKind {
    Pie,
    Bar,
    Histogram,
    Line,
}

/// Declared chart intent over a result set: which column carries the
/// category and, optionally, which carries the numeric value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub category: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<usize>,
}

/// Canonical chart data: parallel category/value sequences in first-seen
/// order. Every renderer consumes this shape, independent of chart kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizData {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl VizData {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
