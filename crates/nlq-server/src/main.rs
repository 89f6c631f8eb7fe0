//! NLQ server
//!
//! Serves the structured-query pipeline over HTTP: schema-validated IR in,
//! parameterized SQL execution and sandboxed chart rendering out.

use std::sync::Arc;
use std::time::Duration;

use nlq_duck::DuckCatalogSource;
use nlq_ir::SchemaCatalog;
use tracing::info;

mod config;
mod http;
mod logging;
mod pipeline;

use config::Config;
use http::AppState;
use pipeline::QueryPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("NLQ_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path)?
    } else {
        Config::from_env()
    };

    config.apply_logging_env();
    logging::init();

    let source = DuckCatalogSource::new(&config.database.path);
    let catalog = Arc::new(SchemaCatalog::load(&source)?);
    info!(
        database = %config.database.path,
        tables = catalog.table_names().len(),
        "catalog loaded"
    );

    let pipeline = QueryPipeline::new(
        catalog,
        &config.database.path,
        config.execution.max_rows,
        Duration::from_millis(config.render.budget_ms),
    );
    let state = AppState::new(Arc::new(pipeline));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("NLQ server listening on {}", addr);

    axum::serve(listener, http::router(state)).await?;

    Ok(())
}
