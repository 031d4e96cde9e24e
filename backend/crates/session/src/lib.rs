//! Session & CAPTCHA Gate Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session/challenge entities, answer matching, image rendering
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, middleware
//!
//! ## Security Model
//! - Backend is the sole authority for challenge answers, TTL, and verification
//! - The plaintext answer never leaves the server; the client only sees the image
//! - Challenges are single-use: a correct answer consumes the challenge atomically
//! - Sessions are HTTP-only `sid` cookies bound to a User-Agent fingerprint
//! - The "human pass" recorded by a successful verification is itself single-use

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use infra::postgres::PgSessionRepository;
pub use presentation::middleware::SessionHandle;
pub use presentation::router::session_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::postgres::PgSessionRepository as SessionStore;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
