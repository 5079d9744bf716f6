//! API Routes
//!
//! - `/api/chat` - Chat with the query router
//! - `/api/files` - Dataset upload (CSV or JSON)
//! - `/api/datasets` - Stored datasets and tabular analysis
//! - `/api/analyze/text` - Sentiment, keywords and summaries
//! - `/api/settings` - Settings and cloud status
//! - `/api/health` - Health check

pub mod analysis;
pub mod chat;
pub mod datasets;
pub mod files;
pub mod health;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::models::AppState;
use crate::settings;
use crate::types::AppError;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let api_router = Router::new()
        .merge(chat::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(datasets::router(state.clone()))
        .merge(settings::router(state.clone()))
        .merge(health::router(state))
        .merge(analysis::router());

    api_router
        .layer(local_cors())
        .layer(TraceLayer::new_for_http())
}

/// Browser front ends are only accepted from loopback origins
fn local_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| {
            let origin = origin.as_bytes();
            ["http://localhost", "http://127.0.0.1", "http://[::1]"]
                .iter()
                .any(|prefix| origin.starts_with(prefix.as_bytes()))
        }))
        .allow_methods(Any)
        .allow_headers(Any)
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StoreNotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::InvalidFile(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CloudDisabled | AppError::MissingApiKey | AppError::LLMApi(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::SchemaVersion(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Crypto(_)
            | AppError::EngineUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
