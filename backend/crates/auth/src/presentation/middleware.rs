//! Auth Middleware
//!
//! Middleware for requiring authentication (and admin roles) on
//! protected routes. On success the request carries a
//! [`kernel::role::Actor`] in its extensions.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use platform::client::{extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;

use crate::application::check_session::CheckSessionUseCase;
use crate::domain::repository::{CredentialRepository, UserRepository};
use session::application::config::SessionConfig;
use session::domain::repository::SessionRepository;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<A, S>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    pub auth_repo: Arc<A>,
    pub session_repo: Arc<S>,
    pub session_config: Arc<SessionConfig>,
}

/// Middleware that requires an authenticated session.
///
/// Inserts the resolved [`kernel::role::Actor`] into request extensions.
pub async fn require_auth<A, S>(
    state: AuthMiddlewareState<A, S>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let headers = req.headers();

    let client_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    let client_ip = extract_client_ip(headers, client_ip);

    let fingerprint = match extract_fingerprint(headers, client_ip) {
        Ok(fp) => fp,
        Err(e) => return Err(crate::error::AuthError::from(e).into_response()),
    };

    let Some(token) = extract_cookie(headers, &state.session_config.session_cookie_name) else {
        return Err(auth_required_response());
    };

    let use_case = CheckSessionUseCase::new(
        state.auth_repo.clone(),
        state.session_repo.clone(),
        state.session_config.clone(),
    );

    let authenticated = match use_case.execute(&token, &fingerprint.hash).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Error checking auth session");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, ()).into_response());
        }
    };

    let Some(user) = authenticated else {
        return Err(auth_required_response());
    };

    req.extensions_mut().insert(user.actor);

    Ok(next.run(req).await)
}

fn auth_required_response() -> Response {
    (StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()
}
