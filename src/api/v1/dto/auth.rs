/*
 * Responsibility
 * - /auth request/response DTOs
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::password::validate_password;
use crate::services::users::NewUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub username: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.full_name.trim().is_empty() {
            return Err("fullName is required");
        }
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("email is invalid");
        }
        validate_password(&self.password)
    }

    pub fn as_new_user(&self) -> NewUser<'_> {
        NewUser {
            full_name: self.full_name.trim(),
            username: self.username.trim(),
            email: self.email.trim(),
            password: &self.password,
        }
    }
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub username: String,
    pub token: String,
}
