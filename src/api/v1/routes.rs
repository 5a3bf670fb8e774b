/*
 * Responsibility
 * - v1 URL layout: /health, /auth/.., /users
 * - The access filter runs in front of all of them (applied in app.rs);
 *   whether a route needs a caller is decided by its handler's extractors
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{sign_in, sign_up},
    health::health,
    users::{delete_user, get_user, list_users, update_user},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/users", get(list_users).put(update_user))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
}
