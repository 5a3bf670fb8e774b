//! Bearer access token -> SecurityContext in request extensions.
//!
//! Fail-open: a missing, malformed, tampered or expired token, an unknown
//! subject, or a credential store failure all leave the context empty. The
//! request is always passed on exactly once; handlers that need a caller
//! reject anonymous requests through `AuthCtxExtractor`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::v1::extractors::{AuthCtx, SecurityContext};
use crate::services::auth::{CredentialLookup, TokenCodec};

const BEARER_PREFIX: &str = "Bearer ";

/// Everything the filter needs: the token codec and the credential store.
#[derive(Clone)]
pub struct AccessFilter {
    tokens: Arc<TokenCodec>,
    credentials: Arc<dyn CredentialLookup>,
}

impl std::fmt::Debug for AccessFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessFilter")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AccessFilter {
    pub fn new(tokens: Arc<TokenCodec>, credentials: Arc<dyn CredentialLookup>) -> Self {
        Self {
            tokens,
            credentials,
        }
    }

    /// Resolve the caller for one request. Never fails; `None` means anonymous.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Option<AuthCtx> {
        let token = bearer_token(headers)?;

        let username = match self.tokens.username_from_token(token) {
            Ok(username) => username,
            Err(err) => {
                debug!(error = %err, "bearer token is not decodable");
                return None;
            }
        };

        if !self.tokens.validate_token(token) {
            debug!("bearer token failed verification");
            return None;
        }

        match self.credentials.lookup(&username).await {
            Ok(Some(principal)) => {
                debug!(user_id = principal.user_id, "request authenticated");
                Some(principal.into())
            }
            Ok(None) => {
                debug!("token subject no longer resolves to an account");
                None
            }
            Err(err) => {
                warn!(error = %err, "credential lookup failed; continuing as anonymous");
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

/// Run the access filter in front of every route of `router`.
///
/// ```ignore
/// let v1 = middleware::auth::access::apply(api::v1::routes(), state.access_filter());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S>(router: Router<S>, filter: AccessFilter) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(filter, access_middleware))
}

async fn access_middleware(
    State(filter): State<AccessFilter>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Whatever arrived with the request is not ours to trust.
    let mut ctx = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_else(SecurityContext::anonymous);
    ctx.clear();

    if let Some(caller) = filter.authenticate(req.headers()).await {
        ctx.set(caller);
    }
    req.extensions_mut().insert(ctx);

    next.run(req).await
}
