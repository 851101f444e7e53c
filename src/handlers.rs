use crate::{
    AppState,
    errors::AppError,
    models::{
        GenerateMemesRequest, GenerateMemesResponse, HealthResponse, HistoryEntry, HistoryEntryResponse,
        HistoryListResponse, MessageResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use std::sync::Arc;
use tracing;

/// POST /api/generate-memes
pub async fn generate_memes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateMemesRequest>, JsonRejection>,
) -> Result<Json<GenerateMemesResponse>, AppError> {
    let Json(request) = payload?;
    let topic = request
        .topic
        .filter(|topic| !topic.is_empty())
        .ok_or(AppError::TopicRequired)?;

    tracing::info!(%topic, "Generating memes");
    let memes = state.orchestrator.generate(&topic).await?;

    let entry = HistoryEntry::new(topic.clone(), memes.clone());
    let history_id = entry.id.clone();
    // History is best-effort: a storage failure never costs the caller their memes.
    if let Err(e) = state.history.append(entry).await {
        tracing::warn!(%topic, %history_id, error = %e, "Failed to record history entry");
    }

    tracing::info!(%topic, %history_id, "Memes generated");
    Ok(Json(GenerateMemesResponse { success: true, memes, history_id }))
}

/// GET /api/history
pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<HistoryListResponse> {
    let history = state.history.list().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load history, returning empty list");
        Vec::new()
    });
    tracing::debug!("Listing {} history entries", history.len());
    Json(HistoryListResponse { success: true, total: history.len(), history })
}

/// GET /api/history/{id}
pub async fn get_history_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HistoryEntryResponse>, AppError> {
    let entry = state.history.get(&id).await?.ok_or(AppError::HistoryNotFound(id))?;
    Ok(Json(HistoryEntryResponse { success: true, entry }))
}

/// DELETE /api/history/{id}
pub async fn delete_history_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.history.delete(&id).await? {
        return Err(AppError::HistoryNotFound(id));
    }
    tracing::info!(history_id = %id, "History entry deleted");
    Ok(Json(MessageResponse { success: true, message: "Deleted".to_string() }))
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let history_count = match state.history.list().await {
        Ok(history) => history.len(),
        Err(e) => {
            tracing::warn!(error = %e, "History unavailable during health check");
            0
        }
    };

    Json(HealthResponse {
        status: "ok",
        message: "AI Meme Generator API is running",
        timestamp: Utc::now(),
        history_count,
        templates: state.orchestrator.template_count(),
        groq_configured: state.groq_configured,
    })
}
