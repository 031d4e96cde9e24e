//! Session & CAPTCHA Error Types
//!
//! This module provides gate-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Note that CAPTCHA *validation* failures are not errors: they are
//! reported as boolean outcomes (see `VerifyOutcome`). The variants here
//! cover infrastructure failures and the session/middleware paths.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Session and CAPTCHA gate error variants
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session not found, expired, or token signature invalid
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Session fingerprint mismatch
    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    /// Challenge has expired (TTL exceeded)
    #[error("CAPTCHA challenge expired")]
    ChallengeExpired,

    /// Rate limit exceeded for challenge issuance
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// A sensitive action was attempted without a fresh CAPTCHA pass
    #[error("CAPTCHA verification required")]
    CaptchaRequired,

    /// Missing required header (e.g., User-Agent)
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// CAPTCHA image rendering failed
    #[error("Image rendering failed: {0}")]
    ImageRender(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::SessionInvalid | SessionError::SessionFingerprintMismatch => {
                StatusCode::UNAUTHORIZED
            }
            SessionError::ChallengeExpired => StatusCode::GONE,
            SessionError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            SessionError::CaptchaRequired => StatusCode::FORBIDDEN,
            SessionError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            SessionError::ImageRender(_)
            | SessionError::Database(_)
            | SessionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::SessionInvalid | SessionError::SessionFingerprintMismatch => {
                ErrorKind::Unauthorized
            }
            SessionError::ChallengeExpired => ErrorKind::Gone,
            SessionError::RateLimitExceeded => ErrorKind::TooManyRequests,
            SessionError::CaptchaRequired => ErrorKind::Forbidden,
            SessionError::MissingHeader(_) => ErrorKind::BadRequest,
            SessionError::ImageRender(_)
            | SessionError::Database(_)
            | SessionError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            SessionError::Database(e) => {
                tracing::error!(error = %e, "Session database error");
            }
            SessionError::ImageRender(msg) => {
                tracing::error!(message = %msg, "CAPTCHA image rendering error");
            }
            SessionError::Internal(msg) => {
                tracing::error!(message = %msg, "Session internal error");
            }
            SessionError::RateLimitExceeded => {
                tracing::warn!("CAPTCHA issuance rate limit exceeded");
            }
            SessionError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            _ => {
                tracing::debug!(error = %self, "Session error");
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::client::FingerprintError> for SessionError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                SessionError::MissingHeader(header)
            }
        }
    }
}
