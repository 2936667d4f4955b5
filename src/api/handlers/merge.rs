use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::middleware::AppError;
use crate::config::Config;
use crate::models::{MergeRequest, MergeResponse};
use crate::services::MergeService;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub merge_service: Arc<MergeService>,
}

/// Merge shard result sets and apply the pagination of the statement
pub async fn merge_results(
    State(state): State<AppState>,
    Json(payload): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AppError> {
    let sql = payload.sql.trim();
    if sql.is_empty() {
        return Err(AppError::Validation("SQL statement cannot be empty".to_string()));
    }

    tracing::info!(
        "Merging {} shard results (database type: {})",
        payload.shards.len(),
        payload
            .database_type
            .map(|t| t.as_str())
            .unwrap_or(state.config.merge.default_database_type.as_str())
    );

    let service = state.merge_service.clone();
    let response = tokio::task::spawn_blocking(move || service.merge(payload))
        .await
        .map_err(|e| AppError::Internal(format!("Merge task failed: {}", e)))??;

    Ok(Json(response))
}
