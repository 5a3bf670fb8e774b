/*
 * Responsibility
 * - POST /auth/signup, POST /auth/signin
 * - Public endpoints: no AuthCtxExtractor here
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::dto::{
        auth::{SignInRequest, SignInResponse, SignUpRequest},
        users::UserResponse,
    },
    error::AppError,
    state::AppState,
};

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_SIGN_UP", msg))?;

    let row = state.users.create_user(req.as_new_user()).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let token = state
        .sign_in
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(SignInResponse {
        username: req.username,
        token,
    }))
}
