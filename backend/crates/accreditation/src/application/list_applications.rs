//! List Applications Use Case

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use auth::domain::value_object::public_id::PublicId;
use kernel::role::Actor;

use crate::domain::entities::Application;
use crate::domain::repository::ApplicationRepository;
use crate::domain::value_objects::CenterKind;
use crate::error::{AccreditationError, AccreditationResult};

/// List applications use case
pub struct ListApplicationsUseCase<R, U>
where
    R: ApplicationRepository,
    U: UserRepository,
{
    repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> ListApplicationsUseCase<R, U>
where
    R: ApplicationRepository,
    U: UserRepository,
{
    pub fn new(repo: Arc<R>, user_repo: Arc<U>) -> Self {
        Self { repo, user_repo }
    }

    /// Applications owned by the user behind a public ID.
    /// Allowed for the owner themselves and for admins.
    pub async fn for_user(
        &self,
        actor: Actor,
        kind: CenterKind,
        owner_public_id: &str,
    ) -> AccreditationResult<Vec<Application>> {
        let public_id = PublicId::parse_str(owner_public_id)
            .map_err(|_| AccreditationError::NotFound)?;

        let owner = self
            .user_repo
            .find_by_public_id(&public_id)
            .await?
            .ok_or(AccreditationError::NotFound)?;

        let owner_id = owner.user_id.into_uuid();

        if !actor.can_access_resource_of(owner_id) {
            return Err(AccreditationError::PermissionDenied(
                "not the resource owner".to_string(),
            ));
        }

        self.repo.list_by_owner(kind, owner_id).await
    }

    /// The full review queue of a kind. Admin only.
    pub async fn all(&self, actor: Actor, kind: CenterKind) -> AccreditationResult<Vec<Application>> {
        if !actor.role.can_review_applications() {
            return Err(AccreditationError::PermissionDenied(
                "review queue is admin-only".to_string(),
            ));
        }

        self.repo.list_all(kind).await
    }
}
