//! Accreditation Backend Module
//!
//! Tracks training/testing center accreditation applications through a
//! fixed review pipeline:
//!
//! ```text
//! submitted -> under_review -> field_visit -> under_evaluation -> accepted
//!                   \---------------\---------------\----------> rejected
//! ```
//!
//! Clean Architecture structure:
//! - `domain/` - Application/certificate entities, the status state
//!   machine, the progress projection
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Review Model
//! - Transitions are validated server-side against the table above;
//!   there is no admin override for illegal jumps
//! - Only admin-grade roles may trigger transitions
//! - `accepted` mints a certificate in the same transaction
//! - Applications are never deleted (audit record)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use domain::value_objects::{ApplicationStatus, CenterKind, Locale};
pub use error::{AccreditationError, AccreditationResult};
pub use infra::postgres::PgApplicationRepository;
pub use presentation::router::applications_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::postgres::PgApplicationRepository as ApplicationStore;
}
