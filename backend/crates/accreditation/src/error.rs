//! Accreditation Error Types
//!
//! This module provides review-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_objects::ApplicationStatus;

/// Accreditation-specific result type alias
pub type AccreditationResult<T> = Result<T, AccreditationError>;

/// A single per-field validation message
#[derive(Debug, Clone)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Accreditation-specific error variants
#[derive(Debug, Error)]
pub enum AccreditationError {
    /// Application or referenced resource missing
    #[error("Application not found")]
    NotFound,

    /// Wrong role or not the resource owner
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Target status not reachable from the current one
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    /// Status string not in the closed vocabulary
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    /// Malformed request body, reported per field
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    /// The row changed under a compare-and-swap update
    #[error("Application was modified concurrently")]
    ConcurrentUpdate,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccreditationError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccreditationError::NotFound => StatusCode::NOT_FOUND,
            AccreditationError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AccreditationError::InvalidTransition { .. }
            | AccreditationError::UnknownStatus(_)
            | AccreditationError::Validation(_) => StatusCode::BAD_REQUEST,
            AccreditationError::ConcurrentUpdate => StatusCode::CONFLICT,
            AccreditationError::Database(_) | AccreditationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccreditationError::NotFound => ErrorKind::NotFound,
            AccreditationError::PermissionDenied(_) => ErrorKind::Forbidden,
            AccreditationError::InvalidTransition { .. }
            | AccreditationError::UnknownStatus(_)
            | AccreditationError::Validation(_) => ErrorKind::BadRequest,
            AccreditationError::ConcurrentUpdate => ErrorKind::Conflict,
            AccreditationError::Database(_) | AccreditationError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let mut err = AppError::new(self.kind(), self.to_string());
        match self {
            AccreditationError::Validation(violations) => {
                for v in violations {
                    err = err.with_field_error(v.field, v.message.clone());
                }
                err
            }
            AccreditationError::InvalidTransition { from, .. } => err.with_action(format!(
                "Allowed next statuses: {}",
                from.successors()
                    .iter()
                    .map(|s| s.code())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccreditationError::Database(e) => {
                tracing::error!(error = %e, "Accreditation database error");
            }
            AccreditationError::Internal(msg) => {
                tracing::error!(message = %msg, "Accreditation internal error");
            }
            AccreditationError::PermissionDenied(msg) => {
                tracing::warn!(reason = %msg, "Accreditation permission denied");
            }
            AccreditationError::InvalidTransition { from, to } => {
                tracing::warn!(from = %from, to = %to, "Illegal status transition refused");
            }
            _ => {
                tracing::debug!(error = %self, "Accreditation error");
            }
        }
    }
}

impl IntoResponse for AccreditationError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AccreditationError> for AppError {
    fn from(err: AccreditationError) -> Self {
        err.to_app_error()
    }
}

impl From<auth::AuthError> for AccreditationError {
    fn from(err: auth::AuthError) -> Self {
        match err {
            auth::AuthError::UserNotFound => AccreditationError::NotFound,
            auth::AuthError::Database(e) => AccreditationError::Database(e),
            other => AccreditationError::Internal(other.to_string()),
        }
    }
}
