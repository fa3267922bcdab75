//! HTTP server for batch coverage lookups.
//!
//! Accepts a map of location ids to addresses and answers with the operators
//! covering each address, per network generation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use coverage::config::Config;
use coverage::dataset::TowerStore;
use coverage::models::{FailureReason, LocationResult, OperatorCoverageMap};
use coverage::{BanGeocoder, CoverageService};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Mobile network coverage API")]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Sites CSV in Lambert-93 (overrides config)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Geocoder base URL (overrides config)
    #[arg(long)]
    geocoder_url: Option<String>,
}

/// Application state shared across handlers
struct AppState {
    service: CoverageService<BanGeocoder>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(dataset) = args.dataset {
        config.dataset.path = dataset;
    }
    if let Some(url) = args.geocoder_url {
        config.geocoder.base_url = url;
    }

    info!("Coverage API Server");

    let store = Arc::new(TowerStore::new(&config.dataset.path));
    let towers = store
        .load()
        .context("Failed to load tower dataset")?;
    info!(
        "Loaded {} towers from {}",
        towers.len(),
        config.dataset.path.display()
    );

    let geocoder = BanGeocoder::new(
        &config.geocoder.base_url,
        config.geocoder.timeout(),
        &config.geocoder.user_agent,
    )?;

    let state = Arc::new(AppState {
        service: CoverageService::new(store, geocoder),
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/coverage", post(coverage_handler))
        .route("/api/v1/dataset/reload", post(reload_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let towers = state
        .service
        .store()
        .load()
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(HealthResponse {
        status: "ok",
        towers: towers.len(),
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    towers: usize,
}

/// Batch coverage lookup: `{ "<id>": "<address>" }`
async fn coverage_handler(
    State(state): State<Arc<AppState>>,
    Json(locations): Json<HashMap<String, String>>,
) -> Result<Json<HashMap<String, LocationResponse>>, (StatusCode, String)> {
    let results = state
        .service
        .resolve_all(locations)
        .await
        .map_err(|e| {
            tracing::error!("Coverage lookup failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        })?;

    Ok(Json(
        results
            .into_iter()
            .map(|(id, result)| (id, LocationResponse::from(result)))
            .collect(),
    ))
}

/// Re-read the sites dataset from disk
async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    let reloaded = tokio::task::spawn_blocking(move || state.service.store().reload())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let towers = reloaded.map_err(|e| {
        tracing::error!("Dataset reload failed: {}", e);
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })?;

    Ok(Json(ReloadResponse {
        towers: towers.len(),
    }))
}

#[derive(Serialize)]
struct ReloadResponse {
    towers: usize,
}

/// Per-location response body
#[derive(Debug, Serialize)]
struct LocationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FailureReason>,
    operators: OperatorCoverageMap,
}

impl From<LocationResult> for LocationResponse {
    fn from(result: LocationResult) -> Self {
        match result {
            LocationResult::Failed(reason) => Self {
                error: Some(reason),
                operators: OperatorCoverageMap::new(),
            },
            LocationResult::Resolved(operators) => Self {
                error: None,
                operators,
            },
        }
    }
}
