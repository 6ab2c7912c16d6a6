//! Sawdesk REST API
//!
//! HTTP API layer for the sharpening reports, built with Axum.
//!
//! Every `/api/v1` route requires an active operator identified by the
//! `x-operator-id` header (see [`auth`]).
//!
//! # Endpoints
//!
//! ## Reports
//! - `GET /api/v1/dashboard-summary` - Today / week / month activity and stale blades
//! - `GET /api/v1/report/blade/:id` - Blade with its full history
//! - `GET /api/v1/report/client/:id` - Client with active blades and histories
//! - `GET /api/v1/report/client/:id/blades` - Client blades with freshness status
//! - `GET /api/v1/statistics` - Aggregate statistics (managers only)
//!
//! ## Search
//! - `GET /api/v1/search/blades?code=`
//! - `GET /api/v1/search/clients?name=`
//! - `GET /api/v1/search/history?from=&to=&kind=`
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use sawdesk::api::{serve, AppState};
//! use sawdesk::config::Config;
//! use sawdesk::store::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (config, _) = Config::load_default()?;
//!     let store = Arc::new(SqliteStore::open(&config.store.database_path)?);
//!     let api = config.api.clone();
//!
//!     serve(AppState::new(store, config), &api).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{Caller, OPERATOR_HEADER};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/dashboard-summary", get(routes::dashboard::dashboard_summary))
        // Report routes
        .route("/report/blade/:id", get(routes::reports::blade_report))
        .route("/report/client/:id", get(routes::reports::client_report))
        .route("/report/client/:id/blades", get(routes::reports::client_blades))
        .route("/statistics", get(routes::statistics::statistics))
        // Search routes
        .route("/search/blades", get(routes::search::search_blades))
        .route("/search/clients", get(routes::search::search_clients))
        .route("/search/history", get(routes::search::search_history));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.api.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            error::attach_error_detail,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS from configured origins; any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, environment = ?config.environment, "Sawdesk API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Sawdesk API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
