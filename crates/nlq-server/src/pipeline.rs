//! Per-request query pipeline
//!
//! Wires Validator → Compiler → Executor → (Transformer → Sandbox) for one
//! structured request. The only shared state is the schema catalog; a fresh
//! read-only DuckDB connection is opened per request since the underlying
//! `Connection` is not `Send + Sync`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nlq_duck::{DuckCatalogSource, DuckExecutor, ExecutionBudget, ExecutionError};
use nlq_ir::{compile, validate, CatalogError, QueryIR, ResultSet, SchemaCatalog};
use nlq_viz::{transform, ChartSpec, RenderResult, Sandbox, VizData};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] nlq_ir::ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Transform(#[from] nlq_viz::TransformError),

    #[error(transparent)]
    Render(#[from] nlq_viz::RenderError),
}

/// Result of a data query: the compiled SQL plus its rows
#[derive(Debug)]
pub struct QueryOutcome {
    pub sql: String,
    pub result: ResultSet,
}

/// Result of a visualization request
#[derive(Debug)]
pub struct VizOutcome {
    pub sql: String,
    pub data: VizData,
    pub rendered: RenderResult,
}

pub struct QueryPipeline {
    catalog: Arc<SchemaCatalog>,
    db_path: PathBuf,
    max_rows: Option<u64>,
    sandbox: Sandbox,
}

impl QueryPipeline {
    pub fn new(
        catalog: Arc<SchemaCatalog>,
        db_path: impl Into<PathBuf>,
        max_rows: Option<u64>,
        render_budget: Duration,
    ) -> Self {
        Self {
            catalog,
            db_path: db_path.into(),
            max_rows,
            sandbox: Sandbox::new(render_budget),
        }
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Re-pull table descriptors from the backing store
    pub fn refresh_catalog(&self) -> Result<(), CatalogError> {
        let source = DuckCatalogSource::new(&self.db_path);
        self.catalog.refresh(&source)?;
        info!(tables = self.catalog.table_names().len(), "catalog refreshed");
        Ok(())
    }

    /// Validate, compile, and execute one structured query
    pub fn run_query(&self, ir: &QueryIR) -> Result<QueryOutcome, PipelineError> {
        let request_id = Uuid::new_v4();
        info!(
            %request_id,
            fingerprint = %ir.fingerprint(),
            table = %ir.table,
            "query request"
        );

        let valid = validate(ir, &self.catalog)?;
        let compiled = compile(&valid);
        debug!(%request_id, sql = %compiled.sql, "compiled query");

        let executor =
            DuckExecutor::open_read_only(&self.db_path).map_err(ExecutionError::Database)?;
        let result = executor.execute(
            &compiled,
            Some(ExecutionBudget {
                max_rows: self.max_rows,
            }),
        )?;

        info!(%request_id, rows = result.row_count, "query executed");
        Ok(QueryOutcome {
            sql: compiled.sql,
            result,
        })
    }

    /// Full visualization path: query, transform, sandboxed render
    pub fn run_visualization(
        &self,
        ir: &QueryIR,
        chart: &ChartSpec,
        renderer_source: &str,
    ) -> Result<VizOutcome, PipelineError> {
        let outcome = self.run_query(ir)?;
        let data = transform(&outcome.result, chart)?;
        let rendered = self.sandbox.render(renderer_source, &data)?;

        info!(points = data.len(), "visualization rendered");
        Ok(VizOutcome {
            sql: outcome.sql,
            data,
            rendered,
        })
    }
}
