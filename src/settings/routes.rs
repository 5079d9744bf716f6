//! Settings API Routes
//!
//! - GET /api/cloud/status   - Effective cloud status (masked key)
//! - GET /api/settings/{key} - Read one setting, `null` when unset
//! - PUT /api/settings/{key} - Write one setting (last write wins)

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use super::{is_secret, mask_secret, resolve_cloud_config, CloudStatus};
use crate::models::{AppState, Setting, SettingUpdate};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/cloud/status", get(cloud_status))
        .route("/api/settings/{key}", get(get_setting).put(put_setting))
        .with_state(state)
}

/// GET /api/cloud/status
async fn cloud_status(State(state): State<AppState>) -> Json<CloudStatus> {
    let config = resolve_cloud_config(&state.config.cloud, &state.store).await;
    Json(CloudStatus::from(&config))
}

/// GET /api/settings/{key}
async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<Setting> {
    let value = match state.store.get_setting(&key).await {
        Some(Value::String(secret)) if is_secret(&key) => json!(mask_secret(&secret)),
        Some(value) => value,
        None => Value::Null,
    };
    Json(Setting { key, value })
}

/// PUT /api/settings/{key}
async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(update): Json<SettingUpdate>,
) -> AppResult<Json<Value>> {
    if key.trim().is_empty() {
        return Err(AppError::InvalidRequest("setting key must not be empty".to_string()));
    }

    state.store.set_setting(&key, update.value).await?;
    info!(key = %key, "Setting updated");

    Ok(Json(json!({ "success": true, "key": key })))
}
