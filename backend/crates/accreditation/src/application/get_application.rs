//! Get Application Use Case

use std::sync::Arc;

use kernel::role::Actor;
use uuid::Uuid;

use crate::domain::entities::Application;
use crate::domain::repository::ApplicationRepository;
use crate::error::{AccreditationError, AccreditationResult};

/// Get application use case
pub struct GetApplicationUseCase<R>
where
    R: ApplicationRepository,
{
    repo: Arc<R>,
}

impl<R> GetApplicationUseCase<R>
where
    R: ApplicationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Owner or admin may read an application.
    pub async fn execute(
        &self,
        actor: Actor,
        application_id: Uuid,
    ) -> AccreditationResult<Application> {
        let application = self
            .repo
            .find_by_id(application_id)
            .await?
            .ok_or(AccreditationError::NotFound)?;

        if !actor.can_access_resource_of(application.owner_user_id) {
            return Err(AccreditationError::PermissionDenied(
                "not the resource owner".to_string(),
            ));
        }

        Ok(application)
    }
}
