//! Review Transition Use Case
//!
//! The single write-path of the review pipeline. Validates the actor's
//! role and the transition table, stamps the review, and mints the
//! certificate when the application is accepted.

use std::sync::Arc;

use chrono::Utc;
use kernel::role::Actor;
use uuid::Uuid;

use crate::domain::entities::{Application, Certificate};
use crate::domain::repository::ApplicationRepository;
use crate::domain::value_objects::ApplicationStatus;
use crate::error::{AccreditationError, AccreditationResult};

/// Review transition input
pub struct ReviewTransitionInput {
    /// Target status wire code
    pub status: String,
    pub review_notes: Option<String>,
}

/// Review transition use case
pub struct ReviewTransitionUseCase<R>
where
    R: ApplicationRepository,
{
    repo: Arc<R>,
}

impl<R> ReviewTransitionUseCase<R>
where
    R: ApplicationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        actor: Actor,
        application_id: Uuid,
        input: ReviewTransitionInput,
    ) -> AccreditationResult<Application> {
        // Role check before anything else: the application state must
        // not be observable through error differences
        if !actor.role.can_review_applications() {
            return Err(AccreditationError::PermissionDenied(format!(
                "role {} cannot review applications",
                actor.role
            )));
        }

        let target = ApplicationStatus::from_code(&input.status)
            .ok_or_else(|| AccreditationError::UnknownStatus(input.status.clone()))?;

        let application = self
            .repo
            .find_by_id(application_id)
            .await?
            .ok_or(AccreditationError::NotFound)?;

        // The transition table is enforced here, server-side. Terminal
        // states refuse everything; illegal jumps are refused outright.
        if !application.status.can_transition_to(target) {
            return Err(AccreditationError::InvalidTransition {
                from: application.status,
                to: target,
            });
        }

        // A certificate exists exactly when the application is accepted
        let certificate = match target {
            ApplicationStatus::Accepted => Some(Certificate::mint(&application)),
            _ => None,
        };

        let updated = self
            .repo
            .apply_transition(
                application.id,
                application.status,
                target,
                input.review_notes,
                Utc::now(),
                certificate,
            )
            .await?;

        tracing::info!(
            application_id = %updated.id,
            from = %application.status,
            to = %target,
            reviewer = %actor.user_id,
            "Application status transitioned"
        );

        Ok(updated)
    }
}
