//! Deal API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use super::DeleteResponse;
use crate::{
    db::DealRepository,
    models::{Deal, DealRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upsert_deal).patch(update_deal))
        .route("/org/{org_id}", get(list_org_deals))
        .route("/{id}", get(get_deal).delete(delete_deal))
}

async fn get_deal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deal>, AppError> {
    let repo = DealRepository::new(&state.db);
    let deal = repo
        .get_by_id(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to get deal"))?;

    match deal {
        Some(d) => Ok(Json(d)),
        None => Err(AppError::not_found("Deal not found")),
    }
}

async fn list_org_deals(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<Deal>>, AppError> {
    let repo = DealRepository::new(&state.db);
    let deals = repo
        .list_by_org(&org_id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to list deals"))?;

    Ok(Json(deals))
}

async fn upsert_deal(
    State(state): State<AppState>,
    Json(payload): Json<DealRequest>,
) -> Result<(StatusCode, Json<Deal>), AppError> {
    payload.validate()?;

    let repo = DealRepository::new(&state.db);
    let deal = repo
        .upsert(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to upsert deal"))?;

    tracing::info!(deal_id = %deal.id, "Deal upserted");

    Ok((StatusCode::CREATED, Json(deal)))
}

async fn update_deal(
    State(state): State<AppState>,
    Json(payload): Json<DealRequest>,
) -> Result<Json<Deal>, AppError> {
    payload.validate()?;

    let repo = DealRepository::new(&state.db);
    let updated = repo
        .update(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to update deal"))?;

    match updated {
        Some(d) => Ok(Json(d)),
        None => Err(AppError::not_found("Deal not found")),
    }
}

async fn delete_deal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let repo = DealRepository::new(&state.db);
    let deleted = repo
        .delete(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to delete deal"))?;

    if deleted {
        Ok(Json(DeleteResponse::new("Deal")))
    } else {
        Err(AppError::not_found("Deal not found"))
    }
}
