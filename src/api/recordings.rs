//! Call recording API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use super::DeleteResponse;
use crate::{
    db::RecordingRepository,
    middleware::AuthContext,
    models::{Recording, RecordingRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_recording).patch(update_recording))
        .route("/{id}", get(get_recording).delete(delete_recording))
        .route("/{org_id}/{email}", get(list_participant_recordings))
}

async fn get_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recording>, AppError> {
    let repo = RecordingRepository::new(&state.db);
    let recording = repo
        .get_by_id(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to get recording"))?;

    match recording {
        Some(r) => Ok(Json(r)),
        None => Err(AppError::not_found("Recording not found")),
    }
}

/// Recordings of an organization that `email` took part in
async fn list_participant_recordings(
    State(state): State<AppState>,
    Path((org_id, email)): Path<(String, String)>,
) -> Result<Json<Vec<Recording>>, AppError> {
    let repo = RecordingRepository::new(&state.db);
    let recordings = repo
        .list_for_participant(&org_id, &email)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to list recordings"))?;

    Ok(Json(recordings))
}

/// Store a recording; the organization defaults to the caller's
async fn create_recording(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(mut payload): Json<RecordingRequest>,
) -> Result<(StatusCode, Json<Recording>), AppError> {
    if payload.org_id.is_none() {
        payload.org_id = auth.org_name;
    }
    payload.validate()?;

    let repo = RecordingRepository::new(&state.db);
    let recording = repo
        .upsert(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to create recording"))?;

    tracing::info!(recording_id = %recording.id, "Recording stored");

    Ok((StatusCode::CREATED, Json(recording)))
}

async fn update_recording(
    State(state): State<AppState>,
    Json(payload): Json<RecordingRequest>,
) -> Result<Json<Recording>, AppError> {
    payload.validate()?;

    let repo = RecordingRepository::new(&state.db);
    let updated = repo
        .update(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to update recording"))?;

    match updated {
        Some(r) => Ok(Json(r)),
        None => Err(AppError::not_found("Recording not found")),
    }
}

async fn delete_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let repo = RecordingRepository::new(&state.db);
    let deleted = repo
        .delete(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to delete recording"))?;

    if deleted {
        Ok(Json(DeleteResponse::new("Recording")))
    } else {
        Err(AppError::not_found("Recording not found"))
    }
}
