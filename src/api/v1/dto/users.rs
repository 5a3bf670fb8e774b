/*
 * Responsibility
 * - Users request/response DTOs (camelCase on the wire)
 * - validate() does shape checks only; uniqueness is the service's job
 */
use serde::{Deserialize, Serialize};

use crate::repos::user_repo::UserRow;
use crate::services::auth::password::validate_password;
use crate::services::users::UserUpdate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
}

impl UpdateUserRequest {
    /// Returns the target id once the body is acceptable.
    pub fn validate(&self) -> Result<i64, &'static str> {
        let id = self.id.ok_or("id must not be null")?;

        if let Some(name) = &self.full_name
            && name.trim().is_empty()
        {
            return Err("fullName cannot be empty");
        }
        if let Some(username) = &self.username
            && username.trim().is_empty()
        {
            return Err("username cannot be empty");
        }
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err("email is invalid");
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }

        Ok(id)
    }

    pub fn changes(&self) -> UserUpdate<'_> {
        UserUpdate {
            full_name: self.full_name.as_deref(),
            username: self.username.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_deref(),
        }
    }
}

/// Never carries the password or its hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            username: row.username,
            email: row.email,
        }
    }
}
