/*
 * Responsibility
 * - User use-cases on top of user_repo (uniqueness checks, password hashing, not-found semantics)
 * - Handlers stay thin: DTO in -> service -> DTO out
 */
use sqlx::PgPool;

use crate::error::AppError;
use crate::repos::user_repo::{self, UserChanges, UserRow};
use crate::services::auth::PasswordHasher;

pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Default)]
pub struct UserUpdate<'a> {
    pub full_name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct UserService {
    db: PgPool,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(db: PgPool, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    pub async fn create_user(&self, new: NewUser<'_>) -> Result<UserRow, AppError> {
        if user_repo::exists_by_email(&self.db, new.email).await? {
            return Err(AppError::conflict("Email already in use."));
        }
        if user_repo::exists_by_username(&self.db, new.username).await? {
            return Err(AppError::conflict("Username already in use."));
        }

        let encrypted = self.hasher.hash(new.password).await?;
        let row =
            user_repo::create(&self.db, new.full_name, new.username, new.email, &encrypted).await?;

        tracing::info!(user_id = row.id, "user created");
        Ok(row)
    }

    pub async fn find_all(&self) -> Result<Vec<UserRow>, AppError> {
        Ok(user_repo::list(&self.db).await?)
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<UserRow, AppError> {
        user_repo::find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(user_id))
    }

    /// Partial update; absent fields keep their stored value.
    pub async fn update_user(
        &self,
        user_id: i64,
        update: UserUpdate<'_>,
    ) -> Result<UserRow, AppError> {
        if !user_repo::exists_by_id(&self.db, user_id).await? {
            return Err(AppError::user_not_found(user_id));
        }

        let encrypted = match update.password {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };

        let changes = UserChanges {
            full_name: update.full_name,
            username: update.username,
            email: update.email,
            encrypted_password: encrypted.as_deref(),
        };

        let updated = user_repo::update_partial(&self.db, user_id, &changes).await?;
        if updated == 0 {
            // deleted between the existence check and the update
            return Err(AppError::user_not_found(user_id));
        }

        self.find_by_id(user_id).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        if !user_repo::delete(&self.db, user_id).await? {
            return Err(AppError::user_not_found(user_id));
        }

        tracing::info!(user_id, "user deleted");
        Ok(())
    }
}
