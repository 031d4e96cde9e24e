//! Accreditation Router
//!
//! One route tree per center kind; the api app nests it under
//! `/api/training-center-applications` and
//! `/api/testing-center-applications` behind the auth middleware.
//! Role and ownership checks live in the use cases.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use auth::domain::repository::UserRepository;
use auth::infra::postgres::PgAuthRepository;

use crate::domain::repository::ApplicationRepository;
use crate::domain::value_objects::CenterKind;
use crate::infra::postgres::PgApplicationRepository;
use crate::presentation::handlers::{self, AccreditationAppState};

/// Create the applications router with PostgreSQL repositories
pub fn applications_router(
    kind: CenterKind,
    repo: PgApplicationRepository,
    user_repo: PgAuthRepository,
) -> Router {
    applications_router_generic(kind, repo, user_repo)
}

/// Create a generic applications router for any repository implementations
pub fn applications_router_generic<R, U>(kind: CenterKind, repo: R, user_repo: U) -> Router
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let state = AccreditationAppState {
        repo: Arc::new(repo),
        user_repo: Arc::new(user_repo),
        kind,
    };

    Router::new()
        .route(
            "/",
            post(handlers::submit::<R, U>).get(handlers::list_all::<R, U>),
        )
        .route("/user/{user_id}", get(handlers::list_for_user::<R, U>))
        .route(
            "/{id}",
            get(handlers::get_by_id::<R, U>).patch(handlers::resubmit::<R, U>),
        )
        .route("/{id}/status", patch(handlers::update_status::<R, U>))
        .with_state(state)
}
