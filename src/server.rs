//! Web server for the quakemap UI.
//!
//! Serves the Leaflet page and the map document it draws:
//! - `/` page shell
//! - `/api/map` styled overlays, basemaps and legend
//! - `/api/legend` depth legend only
//! - `/health` liveness check

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::client::{Endpoints, FeedType, UsgsClient};
use crate::layers::{MapDocument, MapOptions};
use crate::page;
use crate::style::{LegendEntry, legend_buckets};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub feed_type: FeedType,
    pub endpoints: Endpoints,
    pub map: MapOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            feed_type: FeedType::AllWeek,
            endpoints: Endpoints::default(),
            map: MapOptions::default(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/map", get(map_handler))
        .route("/api/legend", get(legend_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let app = create_router(AppState::new(config));

    tracing::info!("🌍 quakemap UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the map shell.
async fn index_handler() -> Html<String> {
    Html(page::served_html())
}

/// Map document handler.
///
/// Both feeds are fetched per request on the blocking pool, earthquakes
/// first. Fetch failures come back as notices inside a 200 response.
async fn map_handler(State(state): State<AppState>) -> Response {
    let config = Arc::clone(&state.config);

    let result = tokio::task::spawn_blocking(move || {
        let client = UsgsClient::with_endpoints(config.feed_type, &config.endpoints)?;
        Ok::<_, crate::errors::QuakemapError>(MapDocument::load(&client, &config.map))
    })
    .await;

    match result {
        Ok(Ok(doc)) => Json(doc).into_response(),
        Ok(Err(e)) => {
            tracing::error!("failed to create feed client: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to create feed client").into_response()
        }
        Err(e) => {
            tracing::error!("map task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "map task failed").into_response()
        }
    }
}

/// Legend handler.
async fn legend_handler() -> Json<Vec<LegendEntry>> {
    Json(legend_buckets())
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}
