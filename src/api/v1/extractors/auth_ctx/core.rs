use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::{AuthCtx, SecurityContext};

/// Extractor for handlers that require an authenticated caller.
/// Expects the access middleware to have put a SecurityContext into request.extensions().
/// An empty or missing context is rejected with 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::get)
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    use super::*;

    async fn extract(ctx: Option<SecurityContext>) -> Result<AuthCtxExtractor, AppError> {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        let (mut parts, _) = req.into_parts();
        AuthCtxExtractor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_context_is_401() {
        let err = extract(None).await.err().unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn anonymous_context_is_401() {
        let err = extract(Some(SecurityContext::anonymous()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authenticated_context_is_extracted() {
        let mut ctx = SecurityContext::anonymous();
        ctx.set(AuthCtx {
            user_id: 7,
            username: "yasmin".to_string(),
            authorities: Vec::new(),
        });

        let AuthCtxExtractor(auth) = extract(Some(ctx)).await.ok().unwrap();
        assert_eq!(auth.user_id, 7);
        assert_eq!(auth.username, "yasmin");
    }
}
