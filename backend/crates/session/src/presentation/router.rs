//! Session Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::config::SessionConfig;
use crate::domain::repository::{ChallengeRateLimitRepository, SessionRepository};
use crate::infra::postgres::PgSessionRepository;
use crate::presentation::handlers::{self, SessionAppState};

/// Create the session/CAPTCHA router with PostgreSQL repository
pub fn session_router(repo: PgSessionRepository, config: SessionConfig) -> Router {
    session_router_generic(repo, config)
}

/// Create a generic session/CAPTCHA router for any repository implementation
pub fn session_router_generic<R>(repo: R, config: SessionConfig) -> Router
where
    R: SessionRepository + ChallengeRateLimitRepository + Clone + Send + Sync + 'static,
{
    let state = SessionAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/captcha", get(handlers::get_captcha::<R>))
        .route("/verify-captcha", post(handlers::verify_captcha::<R>))
        .with_state(state)
}
