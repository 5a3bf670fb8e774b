use std::sync::Arc;

use sqlx::PgPool;
use tracing::{error, info};

use crate::error::AppError;
use crate::repos::user_repo;
use crate::services::auth::{password::PasswordHasher, token_codec::TokenCodec};

/// Username/password sign-in that ends in an access token.
#[derive(Clone, Debug)]
pub struct SignInService {
    db: PgPool,
    tokens: Arc<TokenCodec>,
    hasher: PasswordHasher,
}

impl SignInService {
    pub fn new(db: PgPool, tokens: Arc<TokenCodec>, hasher: PasswordHasher) -> Self {
        Self { db, tokens, hasher }
    }

    /// Unknown username and wrong password both come back as `Unauthorized`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AppError> {
        let Some(user) = user_repo::find_by_username(&self.db, username).await? else {
            info!("sign-in rejected: unknown username");
            return Err(AppError::Unauthorized);
        };

        if !self.hasher.verify(password, &user.encrypted_password).await? {
            info!(user_id = user.id, "sign-in rejected: bad password");
            return Err(AppError::Unauthorized);
        }

        self.tokens.generate_token(&user.username).map_err(|e| {
            error!(user_id = user.id, error = %e, "failed to sign access token");
            AppError::Internal
        })
    }
}
