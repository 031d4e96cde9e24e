//! Resubmit Application Use Case
//!
//! The re-submission path after an admin requests changes: the owning
//! center amends its fields and the application re-enters the pipeline
//! at `submitted`, with the review stamps cleared. Terminal
//! applications are immutable audit records.

use std::sync::Arc;

use kernel::role::Actor;
use uuid::Uuid;

use crate::domain::entities::{Application, ApplicationFields};
use crate::domain::repository::ApplicationRepository;
use crate::domain::services::validate_fields;
use crate::domain::value_objects::ApplicationStatus;
use crate::error::{AccreditationError, AccreditationResult};

/// Resubmit application input
pub struct ResubmitApplicationInput {
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
}

/// Resubmit application use case
pub struct ResubmitApplicationUseCase<R>
where
    R: ApplicationRepository,
{
    repo: Arc<R>,
}

impl<R> ResubmitApplicationUseCase<R>
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
        input: ResubmitApplicationInput,
    ) -> AccreditationResult<Application> {
        let application = self
            .repo
            .find_by_id(application_id)
            .await?
            .ok_or(AccreditationError::NotFound)?;

        // Owner only: admins review, they do not rewrite submissions
        if application.owner_user_id != actor.user_id {
            return Err(AccreditationError::PermissionDenied(
                "only the submitting center may amend an application".to_string(),
            ));
        }

        if application.status.is_terminal() {
            return Err(AccreditationError::InvalidTransition {
                from: application.status,
                to: ApplicationStatus::Submitted,
            });
        }

        validate_fields(&input.center_name, &input.manager_name, &input.city)?;

        let updated = self
            .repo
            .apply_resubmission(
                application.id,
                application.status,
                ApplicationFields {
                    center_name: input.center_name.trim().to_string(),
                    manager_name: input.manager_name.trim().to_string(),
                    city: input.city.trim().to_string(),
                },
            )
            .await?;

        tracing::info!(
            application_id = %updated.id,
            owner = %actor.user_id,
            "Application resubmitted"
        );

        Ok(updated)
    }
}
