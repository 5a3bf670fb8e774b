/*
 * Responsibility
 * - Load Config -> build dependencies -> assemble the Router
 * - Apply middleware (access filter / CORS / security headers / http)
 * - Start with axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::{PasswordHasher, PgCredentialLookup, SignInService, TokenCodec};
use crate::services::users::UserService;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,instagram_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        // Production: default behavior, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("failed to run migrations")?;

    // One codec for the whole process; the secret never changes after startup.
    let tokens = Arc::new(TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.jwt_expiration_seconds,
    )?);
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    let credentials = Arc::new(PgCredentialLookup::new(db.clone()));
    let users = UserService::new(db.clone(), hasher);
    let sign_in = SignInService::new(db.clone(), tokens.clone(), hasher);

    Ok(AppState::new(db, tokens, credentials, users, sign_in))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.access_filter());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // Without a signal handler, keep serving until the process is killed.
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::token_codec::tests::codec;
    use crate::services::auth::{CredentialLookup, LookupError, Principal};

    // Knows nobody: every token subject is stale.
    struct NobodyLookup;

    #[async_trait]
    impl CredentialLookup for NobodyLookup {
        async fn lookup(&self, _username: &str) -> Result<Option<Principal>, LookupError> {
            Ok(None)
        }
    }

    fn test_config() -> Config {
        Config::from_vars(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/instagram_test".to_string()),
            "JWT_SECRET" => Some("s".repeat(64)),
            _ => None,
        })
        .unwrap()
    }

    // The pool never connects; these requests are rejected before any query runs.
    fn test_router() -> Router {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let tokens = Arc::new(codec());
        let hasher = PasswordHasher::new(4);

        let state = AppState::new(
            db.clone(),
            tokens.clone(),
            Arc::new(NobodyLookup),
            UserService::new(db.clone(), hasher),
            SignInService::new(db, tokens, hasher),
        );
        build_router(state, &config)
    }

    async fn get(uri: &str, authorization: Option<String>) -> axum::response::Response {
        let mut req = Request::builder().uri(uri);
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }
        test_router()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn anonymous_user_list_is_401() {
        let res = get("/api/v1/users", None).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");

        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn garbage_bearer_is_401_not_400() {
        let res = get("/api/v1/users/1", Some("Bearer not.a.token".to_string())).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn stale_subject_is_401() {
        let token = codec().generate_token("deleted_user").unwrap();
        let res = get("/api/v1/users", Some(format!("Bearer {token}"))).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let res = get("/api/v1/posts", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
