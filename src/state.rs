/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - db pool, token codec, credential lookup, user / sign-in services
 * - Cheap to Clone (everything inside is Arc/Clone cheap)
 * - Holds nothing request-scoped: the caller lives in request extensions
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::middleware::auth::AccessFilter;
use crate::services::auth::{CredentialLookup, SignInService, TokenCodec};
use crate::services::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenCodec>,
    pub credentials: Arc<dyn CredentialLookup>,
    pub users: UserService,
    pub sign_in: SignInService,
}

impl AppState {
    pub fn new(
        db: PgPool,
        tokens: Arc<TokenCodec>,
        credentials: Arc<dyn CredentialLookup>,
        users: UserService,
        sign_in: SignInService,
    ) -> Self {
        Self {
            db,
            tokens,
            credentials,
            users,
            sign_in,
        }
    }

    pub fn access_filter(&self) -> AccessFilter {
        AccessFilter::new(self.tokens.clone(), self.credentials.clone())
    }
}
