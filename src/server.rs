//! HTTP surface: two read-only analysis documents plus a liveness route.
//! Every request loads and analyzes its own batch on the blocking pool.

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::pipeline;
use crate::views::View;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "analysis request failed");
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    message: &'static str,
    version: &'static str,
    timestamp: i64,
}

async fn home() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "risk analysis service is running",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Load, analyze and render one view off the async reactor
pub async fn render_view(config: Arc<ServiceConfig>, view: View) -> Result<Value> {
    tokio::task::spawn_blocking(move || {
        let annotated = pipeline::analyze_path(&config.data_path, &config.analysis)?;
        view.render(&annotated, &config.analysis)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))?
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<Value>> {
    render_view(state.config, View::Dashboard).await.map(Json)
}

async fn user_activity(State(state): State<AppState>) -> Result<Json<Value>> {
    render_view(state.config, View::UserActivity).await.map(Json)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/analyze/dashboard", get(dashboard))
        .route("/analyze/useractivity", get(user_activity))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let addr = config.bind.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, data = %config.data_path.display(), "listening");

    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Serve)
}
