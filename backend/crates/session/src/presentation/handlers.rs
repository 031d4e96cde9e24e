//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};

use platform::client::{extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;

use crate::application::config::SessionConfig;
use crate::application::issue_challenge::IssueChallengeUseCase;
use crate::application::verify_challenge::{VerifyChallengeInput, VerifyChallengeUseCase};
use crate::domain::repository::{ChallengeRateLimitRepository, SessionRepository};
use crate::error::SessionResult;
use crate::presentation::dto::{CaptchaResponse, VerifyCaptchaRequest, VerifyCaptchaResponse};

const CSRF_HEADER: &str = "x-csrf-token";

/// Shared state for session handlers
#[derive(Clone)]
pub struct SessionAppState<R>
where
    R: SessionRepository + ChallengeRateLimitRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<SessionConfig>,
}

/// GET /api/captcha
///
/// Side effect: stores the challenge on the session, establishing the
/// session first if the request carries no live one.
pub async fn get_captcha<R>(
    State(state): State<SessionAppState<R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
) -> SessionResult<Response>
where
    R: SessionRepository + ChallengeRateLimitRepository + Clone + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let fingerprint = extract_fingerprint(&headers, client_ip)?;

    let cookie_token = extract_cookie(&headers, &state.config.session_cookie_name);

    let use_case =
        IssueChallengeUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(cookie_token.as_deref(), fingerprint)
        .await?;

    let body = CaptchaResponse {
        id: output.challenge_id,
        image: output.image_data_uri,
        csrf_token: output.csrf_token,
        expires_at_ms: output.expires_at_ms,
    };

    let mut response = Json(body).into_response();

    if let Some(token) = output.new_cookie_token {
        let cookie = state.config.cookie_config().build_set_cookie(&token);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }

    Ok(response)
}

/// POST /api/verify-captcha
///
/// Validation failures come back as `{success: false}`, never as 4xx:
/// the caller decides what repeated failures mean.
pub async fn verify_captcha<R>(
    State(state): State<SessionAppState<R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<VerifyCaptchaRequest>,
) -> SessionResult<Json<VerifyCaptchaResponse>>
where
    R: SessionRepository + ChallengeRateLimitRepository + Clone + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let fingerprint = extract_fingerprint(&headers, client_ip)?;

    let cookie_token = extract_cookie(&headers, &state.config.session_cookie_name);

    let csrf_token = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let use_case = VerifyChallengeUseCase::new(state.repo.clone(), state.config.clone());

    let input = VerifyChallengeInput {
        captcha_input: req.captcha_input,
        csrf_token,
    };

    let outcome = use_case
        .execute(cookie_token.as_deref(), &fingerprint, input)
        .await?;

    Ok(Json(VerifyCaptchaResponse {
        success: outcome.is_passed(),
    }))
}
