use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};
use crate::settings::resolve_cloud_config;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = if state.store.is_initialized().await {
        "ready"
    } else {
        "uninitialized"
    };
    let cloud = resolve_cloud_config(&state.config.cloud, &state.store).await;

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        storage: storage.to_string(),
        analysis_engine: state.processor.engine_kind().to_string(),
        cloud_configured: cloud.is_available(),
    })
}
