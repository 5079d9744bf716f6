use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::agents::FileUploadAgent;
use crate::models::{AppState, DatasetSummary};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files", post(upload_file))
        .with_state(state)
}

/// POST /api/files - multipart upload, field `file`
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DatasetSummary>)> {
    info!("File upload request received");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidRequest("file field has no filename".to_string()))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        let dataset = FileUploadAgent::process_file(&filename, &content)?;
        state.store.save_dataset(&dataset).await?;

        return Ok((StatusCode::CREATED, Json(DatasetSummary::from(&dataset))));
    }

    Err(AppError::InvalidRequest("missing 'file' field".to_string()))
}
