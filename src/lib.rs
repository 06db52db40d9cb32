//! Saboteur
//!
//! A network fault-injection agent: an HTTP daemon that installs and removes
//! packet drops, connection resets, latency, packet loss and connection
//! timeouts on its host with `iptables` and `tc`, plus the client used to
//! drive it across many hosts.

pub mod agent;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod fault;
pub mod interfaces;
pub mod logging;
pub mod shell;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::api::AppState;

/// Create the application router with the given state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Faults
        .route("/", post(api::faults::add).delete(api::faults::reset))
        // Health check
        .route("/health", get(api::health::health_check))
        // Metrics (Prometheus)
        .route("/metrics", get(api::metrics::metrics_handler))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
