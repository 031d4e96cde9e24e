//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod establish_session;
pub mod issue_challenge;
pub mod verify_challenge;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::SessionConfig;
pub use establish_session::{EstablishSessionUseCase, EstablishedSession};
pub use issue_challenge::{IssueChallengeOutput, IssueChallengeUseCase};
pub use verify_challenge::{VerifyChallengeInput, VerifyChallengeUseCase};
