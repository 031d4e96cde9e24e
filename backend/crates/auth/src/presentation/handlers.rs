//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;

use platform::client::{extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionStatusResponse,
};
use session::application::check_session::CheckSessionUseCase as SessionCheck;
use session::application::config::SessionConfig;
use session::domain::repository::SessionRepository;
use session::presentation::middleware::SessionHandle;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<A, S>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    pub auth_repo: Arc<A>,
    pub session_repo: Arc<S>,
    pub auth_config: Arc<AuthConfig>,
    pub session_config: Arc<SessionConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register (behind the CAPTCHA gate)
pub async fn register<A, S>(
    State(state): State<AuthAppState<A, S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.auth_repo.clone(),
        state.auth_repo.clone(),
        state.auth_config.clone(),
    );

    let input = RegisterInput {
        user_name: req.user_name,
        password: req.password,
        role: req.role,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            public_id: output.public_id,
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login (behind the CAPTCHA gate)
///
/// The `require_human` middleware already consumed the CAPTCHA pass and
/// attached the [`SessionHandle`]; login binds the user to that session.
pub async fn login<A, S>(
    State(state): State<AuthAppState<A, S>>,
    Extension(handle): Extension<SessionHandle>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.auth_repo.clone(),
        state.auth_repo.clone(),
        state.session_repo.clone(),
        state.auth_config.clone(),
    );

    let input = SignInInput {
        user_name: req.user_name,
        password: req.password,
    };

    let output = use_case.execute(input, handle.session_id).await?;

    Ok(Json(LoginResponse {
        public_id: output.public_id,
        role: output.role.code().to_string(),
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Destroys the session record and clears the cookie.
pub async fn logout<A, S>(
    State(state): State<AuthAppState<A, S>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.session_config.session_cookie_name);

    if let Some(token) = token {
        let session_check =
            SessionCheck::new(state.session_repo.clone(), state.session_config.clone());
        // Ignore errors - just clear the cookie
        let _ = session_check.destroy(&token).await;
    }

    let cookie = state.session_config.cookie_config().build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<A, S>(
    State(state): State<AuthAppState<A, S>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
) -> AuthResult<Json<SessionStatusResponse>>
where
    A: UserRepository + CredentialRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let fingerprint = extract_fingerprint(&headers, client_ip)?;

    let token = extract_cookie(&headers, &state.session_config.session_cookie_name);

    let authenticated_user = if let Some(token) = token {
        let use_case = CheckSessionUseCase::new(
            state.auth_repo.clone(),
            state.session_repo.clone(),
            state.session_config.clone(),
        );
        use_case.execute(&token, &fingerprint.hash).await.ok().flatten()
    } else {
        None
    };

    match authenticated_user {
        Some(user) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(user.public_id),
            user_name: Some(user.user_name),
            role: Some(user.actor.role.code().to_string()),
        })),
        None => Ok(Json(SessionStatusResponse {
            authenticated: false,
            public_id: None,
            user_name: None,
            role: None,
        })),
    }
}
