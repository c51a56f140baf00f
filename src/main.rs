//! RecordMe backend - API server for call recordings and their tenants
//!
//! Serves organizations, users, deals and recordings over HTTP, authenticating
//! callers with tokens issued by an external identity provider.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, EnvFilter, Layer, Registry};

use config::{LogFormat, LogTarget, LoggingConfig};
use recordme_backend::{api, config, db, AppConfig, AppState};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard flushes file logs on drop and must outlive the server
    let _log_guard = init_logging(&config.logging);

    info!(
        environment = %config.environment,
        "RecordMe backend {} starting up",
        env!("CARGO_PKG_VERSION")
    );
    if config.environment.is_local() {
        info!("Local environment: bearer tokens are decoded without verification");
    } else {
        info!(jwks_url = %config.auth.jwks_endpoint(), "Tokens verified against identity provider");
    }

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(config.clone(), db).context("Failed to initialize token validator")?;

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Install the global subscriber for the configured target and format
fn init_logging(log_config: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if matches!(log_config.target, LogTarget::Console | LogTarget::Both) {
        layers.push(fmt_layer(&log_config.format, std::io::stdout));
    }
    if matches!(log_config.target, LogTarget::File | LogTarget::Both) {
        let (writer, file_guard) = create_file_writer(log_config);
        layers.push(fmt_layer(&log_config.format, writer));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    guard
}

fn fmt_layer<W>(format: &LogFormat, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer);
    match format {
        LogFormat::Json => layer.json().with_target(true).boxed(),
        LogFormat::Compact => layer.compact().with_target(false).boxed(),
        LogFormat::Pretty => layer
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Directory holding the SQLite file named by a database URL
fn sqlite_data_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Ensure the data directory exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(parent) = sqlite_data_dir(&config.database.url) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
            info!("Created data directory: {:?}", parent);
        }
    }
    Ok(())
}

/// Wrap the API router in the global middleware layers
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    api::router(state)
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
}
