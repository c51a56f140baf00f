//! User API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use super::DeleteResponse;
use crate::{
    db::UserRepository,
    middleware::AuthContext,
    models::{User, UserRequest},
    utils::AppError,
    AppState,
};

/// Create routes for user management
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_user).post(read_or_create_user).patch(update_user))
        .route("/org/{org_id}", get(list_org_users))
        .route("/{id}", axum::routing::delete(delete_user))
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: Option<String>,
}

/// Get a user by id, defaulting to the caller
async fn get_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<UserQuery>,
) -> Result<Json<User>, AppError> {
    let user_id = query
        .user_id
        .or_else(|| auth.user_id())
        .ok_or_else(|| AppError::bad_request("user_id is required for callers without a user"))?;

    let repo = UserRepository::new(&state.db);
    let user = repo
        .get_by_id(&user_id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to get user"))?;

    match user {
        Some(u) => Ok(Json(u)),
        None => Err(AppError::not_found("User not found")),
    }
}

async fn list_org_users(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    let repo = UserRepository::new(&state.db);
    let users = repo
        .list_by_org(&org_id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to list users"))?;

    Ok(Json(users))
}

/// Return the user for `(org_id, email)`, creating it on first sight.
///
/// Organization and email default to the caller's.
async fn read_or_create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<UserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let payload = payload.with_key_defaults(auth.org_name.as_deref(), auth.email.as_deref());
    payload.validate()?;

    let repo = UserRepository::new(&state.db);
    let user = repo
        .read_or_insert(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to create user"))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update name, role and meta of a user; the key defaults to the caller's
async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<UserRequest>,
) -> Result<Json<User>, AppError> {
    let payload = payload.with_caller_key(auth.org_name.as_deref(), auth.email.as_deref());
    payload.validate()?;

    let repo = UserRepository::new(&state.db);
    let updated = repo
        .update(&payload)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to update user"))?;

    match updated {
        Some(u) => Ok(Json(u)),
        None => Err(AppError::not_found("User not found")),
    }
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let repo = UserRepository::new(&state.db);
    let deleted = repo
        .delete(&id)
        .await
        .map_err(|e| AppError::from_repository(e, "Failed to delete user"))?;

    if deleted {
        Ok(Json(DeleteResponse::new("User")))
    } else {
        Err(AppError::not_found("User not found"))
    }
}
