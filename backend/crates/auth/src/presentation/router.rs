//! Auth Router

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use session::application::config::SessionConfig;
use session::domain::repository::SessionRepository;
use session::infra::postgres::PgSessionRepository;
use session::presentation::middleware::{SessionMiddlewareState, require_human};

/// Create the Auth router with PostgreSQL repositories
pub fn auth_router(
    auth_repo: PgAuthRepository,
    session_repo: PgSessionRepository,
    auth_config: AuthConfig,
    session_config: SessionConfig,
) -> Router {
    auth_router_generic(auth_repo, session_repo, auth_config, session_config)
}

/// Create a generic Auth router for any repository implementations
pub fn auth_router_generic<A, S>(
    auth_repo: A,
    session_repo: S,
    auth_config: AuthConfig,
    session_config: SessionConfig,
) -> Router
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        auth_repo: Arc::new(auth_repo),
        session_repo: Arc::new(session_repo),
        auth_config: Arc::new(auth_config),
        session_config: Arc::new(session_config),
    };

    // Login and registration are sensitive actions: each attempt consumes
    // a fresh CAPTCHA pass.
    let gate_state = SessionMiddlewareState {
        repo: state.session_repo.clone(),
        config: state.session_config.clone(),
    };
    let register_gate = {
        let gate = gate_state.clone();
        middleware::from_fn(move |req: axum::extract::Request, next: middleware::Next| {
            require_human(gate.clone(), req, next)
        })
    };
    let login_gate = {
        let gate = gate_state.clone();
        middleware::from_fn(move |req: axum::extract::Request, next: middleware::Next| {
            require_human(gate.clone(), req, next)
        })
    };

    Router::new()
        .route(
            "/register",
            post(handlers::register::<A, S>).route_layer(register_gate),
        )
        .route(
            "/login",
            post(handlers::login::<A, S>).route_layer(login_gate),
        )
        .route("/logout", post(handlers::logout::<A, S>))
        .route("/status", get(handlers::session_status::<A, S>))
        .with_state(state)
}
