//! Vega-Lite artifact construction
//!
//! The interpreter configures an [`ArtifactBuilder`]; `emit` produces the
//! final Vega-Lite JSON document with the chart data inlined.

use serde_json::json;

use crate::VizData;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    Pie,
    Bar,
    Hist,
    Line,
}

#[derive(Debug, Default)]
pub(crate) struct ArtifactBuilder {
    pub(crate) title: Option<String>,
    pub(crate) xlabel: Option<String>,
    pub(crate) ylabel: Option<String>,
}

impl ArtifactBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serialize the configured chart over the injected data
    pub(crate) fn emit(&self, mark: Mark, data: &VizData) -> Vec<u8> {
        let values: Vec<serde_json::Value> = data
            .categories
            .iter()
            .zip(&data.values)
            .map(|(category, value)| json!({ "category": category, "value": value }))
            .collect();

        let (mark_json, encoding) = match mark {
            Mark::Pie => (
                json!({ "type": "arc" }),
                json!({
                    "theta": { "field": "value", "type": "quantitative" },
                    "color": { "field": "category", "type": "nominal" }
                }),
            ),
            Mark::Bar | Mark::Hist => (
                json!("bar"),
                json!({
                    "x": { "field": "category", "type": "nominal" },
                    "y": { "field": "value", "type": "quantitative" }
                }),
            ),
            Mark::Line => (
                json!("line"),
                json!({
                    "x": { "field": "category", "type": "ordinal" },
                    "y": { "field": "value", "type": "quantitative" }
                }),
            ),
        };

        let mut spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "data": { "values": values },
            "mark": mark_json,
            "encoding": encoding
        });

        if let Some(title) = &self.title {
            spec["title"] = json!(title);
        }
        // Axis labels only apply to positional encodings; arc charts have none.
        if mark != Mark::Pie {
            if let Some(xlabel) = &self.xlabel {
                spec["encoding"]["x"]["title"] = json!(xlabel);
            }
            if let Some(ylabel) = &self.ylabel {
                spec["encoding"]["y"]["title"] = json!(ylabel);
            }
        }

        spec.to_string().into_bytes()
    }
}
