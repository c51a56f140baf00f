//! Organization (tenant) API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use super::DeleteResponse;
use crate::{
    db::OrganizationRepository,
    models::{Organization, OrganizationRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_organizations)
                .post(upsert_organization)
                .patch(update_organization),
        )
        .route("/{id}", get(get_organization).delete(delete_organization))
}

async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let repo = OrganizationRepository::new(&state.db);
    let orgs = repo
        .list()
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to list organizations"))?;

    Ok(Json(orgs))
}

async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Organization>, AppError> {
    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .get_by_id(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to get organization"))?;

    match org {
        Some(o) => Ok(Json(o)),
        None => Err(AppError::not_found("Organization not found")),
    }
}

async fn upsert_organization(
    State(state): State<AppState>,
    Json(payload): Json<OrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    payload.validate()?;

    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .upsert(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to upsert organization"))?;

    tracing::info!(org_id = %org.id, "Organization upserted");

    Ok((StatusCode::CREATED, Json(org)))
}

async fn update_organization(
    State(state): State<AppState>,
    Json(payload): Json<OrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    payload.validate()?;

    let repo = OrganizationRepository::new(&state.db);
    let updated = repo
        .update(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to update organization"))?;

    match updated {
        Some(o) => Ok(Json(o)),
        None => Err(AppError::not_found("Organization not found")),
    }
}

async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let repo = OrganizationRepository::new(&state.db);
    let deleted = repo
        .delete(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to delete organization"))?;

    if deleted {
        tracing::info!(org_id = %id, "Organization deleted");
        Ok(Json(DeleteResponse::new("Organization")))
    } else {
        Err(AppError::not_found("Organization not found"))
    }
}
