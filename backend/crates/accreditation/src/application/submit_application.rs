//! Submit Application Use Case
//!
//! Creates an accreditation request for the actor's own center.

use std::sync::Arc;

use kernel::role::{Actor, UserRole};

use crate::domain::entities::{Application, ApplicationFields};
use crate::domain::repository::ApplicationRepository;
use crate::domain::services::validate_fields;
use crate::domain::value_objects::CenterKind;
use crate::error::{AccreditationError, AccreditationResult};

/// Submit application input
pub struct SubmitApplicationInput {
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
}

/// Submit application use case
pub struct SubmitApplicationUseCase<R>
where
    R: ApplicationRepository,
{
    repo: Arc<R>,
}

impl<R> SubmitApplicationUseCase<R>
where
    R: ApplicationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        actor: Actor,
        kind: CenterKind,
        input: SubmitApplicationInput,
    ) -> AccreditationResult<Application> {
        // Only the matching center role may submit for this kind
        let required = match kind {
            CenterKind::Training => UserRole::TrainingCenter,
            CenterKind::Testing => UserRole::TestingCenter,
        };
        if actor.role != required {
            return Err(AccreditationError::PermissionDenied(format!(
                "role {} cannot submit {} center applications",
                actor.role, kind
            )));
        }

        validate_fields(&input.center_name, &input.manager_name, &input.city)?;

        let application = Application::new(
            kind,
            actor.user_id,
            ApplicationFields {
                center_name: input.center_name.trim().to_string(),
                manager_name: input.manager_name.trim().to_string(),
                city: input.city.trim().to_string(),
            },
        );

        self.repo.create(&application).await?;

        tracing::info!(
            application_id = %application.id,
            owner = %actor.user_id,
            kind = %kind,
            "Accreditation application submitted"
        );

        Ok(application)
    }
}
