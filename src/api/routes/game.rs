use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tokio::sync::MutexGuard;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::game::{GameSession, PlayOutcome, SessionSnapshot};
use crate::models::Hand;

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub hand: Hand,
}

/// Take the session unless a round or reload is already running.
fn acquire(state: &AppState) -> Result<MutexGuard<'_, GameSession>, ApiError> {
    state
        .session
        .try_lock()
        .map_err(|_| ApiError::Conflict("A round is already in progress".to_string()))
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

/// Play a round. A failed save still answers 200: the round is shown and
/// the snapshot carries the error.
pub async fn play(
    State(state): State<AppState>,
    payload: Result<Json<PlayRequest>, JsonRejection>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut session = acquire(&state)?;

    if let PlayOutcome::Unsaved { record, .. } = session.play(request.hand).await {
        tracing::warn!("Round at {} was not saved", record.timestamp);
    }

    Ok(Json(session.snapshot()))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut session = acquire(&state)?;
    session.reset();
    Ok(Json(session.snapshot()))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut session = acquire(&state)?;
    session
        .load()
        .await
        .map_err(|_| ApiError::Internal("Failed to fetch history".to_string()))?;
    Ok(Json(session.snapshot()))
}
