//! Structured logging for the NLQ server
//!
//! Supports human-readable console output for development, JSON for
//! production, and daily-rotated log files, selected via environment:
//!
//! - `RUST_LOG`: level filter (e.g. "debug", "nlq_server=trace,axum=warn")
//! - `LOG_FORMAT`: "pretty", "json", or "compact"
//! - `LOG_OUTPUT`: "stdout", "file", or "both"
//! - `LOG_DIR`: directory for log files (default "./logs")

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Log format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    File,
    Both,
}

impl LogOutput {
    pub fn from_env() -> Self {
        match std::env::var("LOG_OUTPUT").as_deref() {
            Ok("file") => LogOutput::File,
            Ok("both") => LogOutput::Both,
            _ => LogOutput::Stdout,
        }
    }
}

/// Initialize the logging system from environment configuration
pub fn init() {
    let format = LogFormat::from_env();
    let output = LogOutput::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
        // Filter out noisy third-party crates
        .add_directive("hyper=warn".parse().expect("static directive"))
        .add_directive("tower=warn".parse().expect("static directive"))
        .add_directive("h2=warn".parse().expect("static directive"));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if matches!(output, LogOutput::Stdout | LogOutput::Both) {
        layers.push(match format {
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_target(true)
                .boxed(),
            LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
            LogFormat::Compact => fmt::layer().compact().boxed(),
        });
    }

    if matches!(output, LogOutput::File | LogOutput::Both) {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        std::fs::create_dir_all(&log_dir).ok();
        let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "nlq-server.log");
        layers.push(fmt::layer().with_writer(appender).with_ansi(false).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    tracing::info!(format = ?format, output = ?output, "logging initialized");
}
