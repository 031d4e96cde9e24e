//! Application Layer
//!
//! Use cases and application services.

pub mod get_application;
pub mod list_applications;
pub mod resubmit_application;
pub mod review_transition;
pub mod submit_application;

// Re-exports
pub use get_application::GetApplicationUseCase;
pub use list_applications::ListApplicationsUseCase;
pub use resubmit_application::{ResubmitApplicationInput, ResubmitApplicationUseCase};
pub use review_transition::{ReviewTransitionInput, ReviewTransitionUseCase};
pub use submit_application::{SubmitApplicationInput, SubmitApplicationUseCase};
