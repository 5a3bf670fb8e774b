use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{error::RepoError, user_repo};

/// A stored identity resolved from a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub authorities: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Username -> stored identity.
///
/// - `Ok(Some(_))`: found
/// - `Ok(None)`: no such user (deleted / renamed since the token was issued)
/// - `Err(_)`: backend failure (the request filter degrades to anonymous)
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn lookup(&self, username: &str) -> Result<Option<Principal>, LookupError>;
}

/// Postgres-backed lookup over the users table.
#[derive(Clone, Debug)]
pub struct PgCredentialLookup {
    db: PgPool,
}

impl PgCredentialLookup {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialLookup for PgCredentialLookup {
    async fn lookup(&self, username: &str) -> Result<Option<Principal>, LookupError> {
        let row = user_repo::find_by_username(&self.db, username)
            .await
            .map_err(|e| match e {
                RepoError::Db(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                    LookupError::Unavailable("connection pool exhausted or closed".to_string())
                }
                other => LookupError::Repo(other),
            })?;

        // No role model yet: every account gets an empty authority set.
        Ok(row.map(|u| Principal {
            user_id: u.id,
            username: u.username,
            authorities: Vec::new(),
        }))
    }
}
