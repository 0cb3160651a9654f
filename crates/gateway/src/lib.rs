//! HTTP API gateway for dbtchat.
//!
//! Routes:
//! - `GET /health`: liveness and version
//! - `GET /api/projects`: the portal catalog
//! - `POST /api/chat`: one guarded, manifest-aware chat turn
//!
//! Built on Axum; the pipeline itself lives in `dbtchat-context`.

mod api;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use dbtchat_assistant::HttpAssistant;
use dbtchat_config::{AppConfig, GatewayConfig};
use dbtchat_context::ChatPipeline;
use dbtchat_portal::ProjectCatalog;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub catalog: ProjectCatalog,
    pub pipeline: ChatPipeline,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS (any origin unless `allowed_origins` is configured)
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/projects", get(api::projects_handler))
        .route("/api/chat", post(api::chat_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let assistant = Arc::new(HttpAssistant::from_config(&config.assistant)?);
    let pipeline = ChatPipeline::from_config(&config, assistant)?;
    let state = Arc::new(GatewayState {
        catalog: ProjectCatalog::new(&config.portal_dir),
        pipeline,
    });

    let app = build_router(state, &config.gateway);

    info!(
        addr = %addr,
        portal = %config.portal_dir.display(),
        threshold_bytes = config.manifest.reduction_threshold_bytes,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
