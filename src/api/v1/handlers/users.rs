/*
 * Responsibility
 * - /users CRUD handlers
 * - Every handler takes AuthCtxExtractor: anonymous callers get 401 here,
 *   the access filter itself never rejects
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{
        dto::users::{UpdateUserRequest, UserResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn list_users(
    AuthCtxExtractor(_caller): AuthCtxExtractor,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = state.users.find_all().await?;

    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    AuthCtxExtractor(_caller): AuthCtxExtractor,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let row = state.users.find_by_id(user_id).await?;

    Ok(Json(row.into()))
}

pub async fn update_user(
    AuthCtxExtractor(caller): AuthCtxExtractor,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = req
        .validate()
        .map_err(|msg| AppError::bad_request("INVALID_USER_UPDATE", msg))?;

    let row = state.users.update_user(user_id, req.changes()).await?;
    tracing::info!(user_id, by = caller.user_id, "user updated");

    Ok(Json(row.into()))
}

pub async fn delete_user(
    AuthCtxExtractor(caller): AuthCtxExtractor,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<&'static str, AppError> {
    state.users.delete_user(user_id).await?;
    tracing::info!(user_id, by = caller.user_id, "user delete requested");

    Ok("user was deleted!")
}
