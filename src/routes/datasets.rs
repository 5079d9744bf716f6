use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{Operation, TabularReport};
use crate::models::{AppState, Dataset, DatasetSummary};
use crate::types::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AnalyzeDatasetRequest {
    pub operation: Operation,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/datasets", get(list_datasets))
        .route("/api/datasets/{id}", get(get_dataset).delete(delete_dataset))
        .route("/api/datasets/{id}/analyze", post(analyze_dataset))
        .with_state(state)
}

async fn list_datasets(State(state): State<AppState>) -> Json<Vec<DatasetSummary>> {
    let datasets = state.store.list_datasets().await;
    Json(datasets.iter().map(DatasetSummary::from).collect())
}

async fn get_dataset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Dataset>> {
    state
        .store
        .get_dataset(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("dataset {}", id)))
}

async fn delete_dataset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.store.delete_dataset(id).await? {
        info!(dataset_id = %id, "Dataset deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("dataset {}", id)))
    }
}

async fn analyze_dataset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeDatasetRequest>,
) -> AppResult<Json<TabularReport>> {
    info!(dataset_id = %id, operation = ?request.operation, "Dataset analysis request received");

    let dataset = state
        .store
        .get_dataset(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("dataset {}", id)))?;

    let report = state.processor.process(&dataset.data, request.operation)?;
    Ok(Json(report))
}
