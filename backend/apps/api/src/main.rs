//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; application-level errors go
//! through `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;

use accreditation::{CenterKind, PgApplicationRepository, applications_router};
use auth::middleware::{AuthMiddlewareState, require_auth};
use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use session::{PgSessionRepository, SessionConfig, session_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,session=info,auth=info,accreditation=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired sessions and stale rate-limit rows.
    // Expiry is otherwise checked lazily at validation time, so this is
    // the only sweep. Errors here should not prevent server startup.
    let session_store_for_cleanup = PgSessionRepository::new(pool.clone());
    match session_store_for_cleanup.cleanup_expired_data().await {
        Ok((sessions, rate_limits)) => {
            tracing::info!(
                sessions_deleted = sessions,
                rate_limits_deleted = rate_limits,
                "Session cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    // Session/CAPTCHA configuration
    let session_config = if cfg!(debug_assertions) {
        SessionConfig::development()
    } else {
        // In production, load the secret from environment
        let secret_b64 =
            env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in production");
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&secret_bytes);
        SessionConfig {
            session_secret: secret,
            ..SessionConfig::default()
        }
    };

    let auth_config = AuthConfig {
        password_pepper: env::var("PASSWORD_PEPPER")
            .ok()
            .map(|p| p.into_bytes()),
    };

    let session_store = PgSessionRepository::new(pool.clone());
    let auth_store = PgAuthRepository::new(pool.clone());
    let application_store = PgApplicationRepository::new(pool.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-csrf-token"),
        ]))
        .allow_credentials(true);

    // Application routes (both center kinds) require an authenticated actor
    let auth_mw_state = AuthMiddlewareState {
        auth_repo: Arc::new(auth_store.clone()),
        session_repo: Arc::new(session_store.clone()),
        session_config: Arc::new(session_config.clone()),
    };
    let require_actor = {
        let state = auth_mw_state.clone();
        axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                require_auth(state.clone(), req, next)
            },
        )
    };

    let applications = Router::new()
        .nest(
            "/training-center-applications",
            applications_router(
                CenterKind::Training,
                application_store.clone(),
                auth_store.clone(),
            ),
        )
        .nest(
            "/testing-center-applications",
            applications_router(
                CenterKind::Testing,
                application_store.clone(),
                auth_store.clone(),
            ),
        )
        .layer(require_actor);

    // Build router
    let app = Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(session_router(
                    session_store.clone(),
                    session_config.clone(),
                ))
                .nest(
                    "/auth",
                    auth_router(
                        auth_store.clone(),
                        session_store.clone(),
                        auth_config,
                        session_config.clone(),
                    ),
                )
                .merge(applications),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
