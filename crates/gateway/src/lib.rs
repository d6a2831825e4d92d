//! HTTP API gateway for vahed.
//!
//! Exposes the course advisor over HTTP, plus health and catalogue
//! endpoints for the registration front-end.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;
pub mod bootstrap;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{
    Router,
    routing::{get, options, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use vahed_advisor::CoursePlanner;

pub use bootstrap::{bootstrap, bootstrap_with_generator};

/// Shared application state for the gateway.
pub struct AppState {
    pub planner: Arc<CoursePlanner>,
}

pub type SharedState = Arc<AppState>;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS restricted to the configured origins
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, gateway: &vahed_config::GatewayConfig) -> Router {
    Router::new()
        .route("/get_courses", post(api::get_courses))
        .route("/ask", options(api::options_ask))
        .route("/health", get(api::health))
        .route("/programs", get(api::programs))
        .route("/courses", get(api::courses))
        .with_state(state)
        .layer(DefaultBodyLimit::max(gateway.max_body_bytes))
        .layer(cors_layer(&gateway.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Corpus loading and index construction happen once, before binding.
pub async fn start(config: vahed_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let planner = bootstrap(&config).await?;
    let app = build_router(Arc::new(AppState { planner }), &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
