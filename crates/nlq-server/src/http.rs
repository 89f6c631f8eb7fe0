//! HTTP surface for structured query and visualization requests
//!
//! Every endpoint accepts already-structured objects (Query IR, chart spec,
//! renderer source). Free-form user text never reaches this server; parsing
//! model output into IR is the caller's job.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use nlq_ir::QueryIR;
use nlq_viz::{ChartSpec, RenderError, VizData};

use crate::pipeline::{PipelineError, QueryPipeline};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<QueryPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<QueryPipeline>) -> Self {
        Self { pipeline }
    }
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub ir: QueryIR,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

#[derive(Deserialize)]
pub struct VisualizeRequest {
    pub ir: QueryIR,
    pub chart: ChartSpec,
    pub renderer_source: String,
}

#[derive(Serialize)]
pub struct VisualizeResponse {
    pub sql: String,
    pub data: VizData,
    /// Vega-Lite JSON document produced by the sandboxed renderer
    pub artifact: serde_json::Value,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(execute_query))
        .route("/visualize", post(render_visualization))
        .route("/catalog", get(get_catalog))
        .route("/catalog/refresh", post(refresh_catalog))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn execute_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.pipeline.run_query(&req.ir).map_err(api_error)?;

    Ok(Json(QueryResponse {
        sql: outcome.sql,
        columns: outcome.result.columns,
        rows: outcome.result.rows,
        row_count: outcome.result.row_count,
    }))
}

async fn render_visualization(
    State(state): State<AppState>,
    Json(req): Json<VisualizeRequest>,
) -> Result<Json<VisualizeResponse>, ApiError> {
    let outcome = state
        .pipeline
        .run_visualization(&req.ir, &req.chart, &req.renderer_source)
        .map_err(api_error)?;

    // The artifact bytes are a JSON document; hand it through structurally.
    let artifact = serde_json::from_slice(&outcome.rendered.artifact).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Malformed artifact: {}", e),
            }),
        )
    })?;

    Ok(Json(VisualizeResponse {
        sql: outcome.sql,
        data: outcome.data,
        artifact,
    }))
}

async fn get_catalog(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tables = state.pipeline.catalog().snapshot();
    Json(json!({
        "tables": tables,
        "table_count": tables.len()
    }))
}

async fn refresh_catalog(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.pipeline.refresh_catalog().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(json!({
        "tables": state.pipeline.catalog().table_names()
    })))
}

async fn health_check() -> &'static str {
    "OK"
}

fn api_error(err: PipelineError) -> ApiError {
    let status = match &err {
        // Malformed input: retrying without new input is pointless.
        PipelineError::Validation(_) | PipelineError::Transform(_) => StatusCode::BAD_REQUEST,
        PipelineError::Render(render) => match render {
            RenderError::Parse(_) | RenderError::SandboxViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        PipelineError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(status = %status, error = %err, "request failed");
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
