//! # Ohlcview Web
//!
//! HTTP front end for the chart query service.
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/health` | GET | Liveness probe |
//! | `/api/companies` | GET | Companies and the stored date range |
//! | `/api/chart-data/` | POST | Aggregated OHLC series as parallel arrays |
//!
//! Errors are JSON objects of the form `{"error": "..."}`. Store access runs
//! on tokio's blocking pool.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use ohlcview_core::{ChartService, Warehouse};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, ServeError};
pub use handlers::CompaniesResponse;

/// Listener and request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    charts: ChartService<Warehouse>,
}

impl AppState {
    pub fn new(warehouse: Warehouse) -> Self {
        Self {
            charts: ChartService::new(warehouse),
        }
    }
}

/// Build the application router.
pub fn router(warehouse: Warehouse, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/companies", get(handlers::companies))
        .route(
            "/api/chart-data/",
            post(handlers::chart_data).fallback(handlers::method_not_allowed),
        )
        .with_state(AppState::new(warehouse));
    with_http_layers(routes, config.request_timeout)
}

fn with_http_layers(routes: Router, request_timeout: Duration) -> Router {
    routes
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::map_response(handlers::timeout_body))
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C.
pub async fn serve(warehouse: Warehouse, config: ServerConfig) -> Result<(), ServeError> {
    let app = router(warehouse, &config);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServeError::Bind {
            address: config.bind,
            source,
        })?;

    info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
