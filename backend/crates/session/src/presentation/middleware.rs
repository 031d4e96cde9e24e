//! Session Middleware
//!
//! Gates that other route trees compose in front of their handlers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use platform::cookie::extract_cookie;
use platform::token::verify_session_token;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::SessionConfig;
use crate::domain::repository::SessionRepository;

/// Identity of the request's session, inserted into request extensions.
/// The token signature is proof the server issued it.
#[derive(Debug, Clone, Copy)]
pub struct SessionHandle {
    pub session_id: Uuid,
}

/// Middleware state
#[derive(Clone)]
pub struct SessionMiddlewareState<R>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<SessionConfig>,
}

/// Middleware that requires a fresh, single-use CAPTCHA pass.
///
/// Protects sensitive actions (login, registration): the pass recorded
/// by `verify-captcha` is consumed here, so every attempt needs its own
/// solved challenge. On success the request carries a [`SessionHandle`].
pub async fn require_human<R>(
    state: SessionMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: SessionRepository + Clone + Send + Sync + 'static,
{
    let headers = req.headers();

    let token = extract_cookie(headers, &state.config.session_cookie_name);

    let Some(token) = token else {
        return Err(captcha_required_response());
    };

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());

    let passed = match use_case.consume_captcha_pass(&token).await {
        Ok(passed) => passed,
        Err(e) => {
            tracing::error!(error = %e, "Error consuming CAPTCHA pass");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, ()).into_response());
        }
    };

    if !passed {
        return Err(captcha_required_response());
    }

    let Some(session_id) = verify_session_token(&token, &state.config.session_secret) else {
        return Err(captcha_required_response());
    };

    req.extensions_mut().insert(SessionHandle { session_id });

    Ok(next.run(req).await)
}

fn captcha_required_response() -> Response {
    (StatusCode::FORBIDDEN, [("X-Captcha-Required", "true")]).into_response()
}
