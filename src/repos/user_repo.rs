/*
 * Responsibility
 * - SQLx operations on the users table
 * - Takes a PgPool and provides CRUD + the lookups auth needs
 * - Unique violations surface as RepoError::Conflict
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub encrypted_password: String,
}

/// Fields for a partial update. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub full_name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub encrypted_password: Option<&'a str>,
}

pub async fn list(db: &PgPool) -> Result<Vec<UserRow>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, full_name, username, email, encrypted_password
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, user_id: i64) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, full_name, username, email, encrypted_password
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, full_name, username, email, encrypted_password
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn exists_by_id(db: &PgPool, user_id: i64) -> Result<bool, RepoError> {
    let exists: bool = sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)"#)
        .bind(user_id)
        .fetch_one(db)
        .await?;

    Ok(exists)
}

pub async fn exists_by_email(db: &PgPool, email: &str) -> Result<bool, RepoError> {
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#)
            .bind(email)
            .fetch_one(db)
            .await?;

    Ok(exists)
}

pub async fn exists_by_username(db: &PgPool, username: &str) -> Result<bool, RepoError> {
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)"#)
            .bind(username)
            .fetch_one(db)
            .await?;

    Ok(exists)
}

pub async fn create(
    db: &PgPool,
    full_name: &str,
    username: &str,
    email: &str,
    encrypted_password: &str,
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (full_name, username, email, encrypted_password)
        VALUES ($1, $2, $3, $4)
        RETURNING id, full_name, username, email, encrypted_password
        "#,
    )
    .bind(full_name)
    .bind(username)
    .bind(email)
    .bind(encrypted_password)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Returns the number of rows touched (0 when `user_id` does not exist).
pub async fn update_partial(
    db: &PgPool,
    user_id: i64,
    changes: &UserChanges<'_>,
) -> Result<u64, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET
            full_name          = COALESCE($2, full_name),
            username           = COALESCE($3, username),
            email              = COALESCE($4, email),
            encrypted_password = COALESCE($5, encrypted_password)
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(changes.full_name)
    .bind(changes.username)
    .bind(changes.email)
    .bind(changes.encrypted_password)
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected())
}

pub async fn delete(db: &PgPool, user_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
