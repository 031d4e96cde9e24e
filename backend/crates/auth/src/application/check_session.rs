//! Check Session Use Case
//!
//! Resolves the authenticated user (the `Actor`) behind a `sid` token.

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::AuthResult;
use kernel::role::Actor;
use session::application::check_session::CheckSessionUseCase as SessionCheck;
use session::application::config::SessionConfig;
use session::domain::repository::SessionRepository;

/// Authenticated user info resolved from a session
pub struct AuthenticatedUser {
    pub actor: Actor,
    pub public_id: String,
    pub user_name: String,
}

/// Check session use case
pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    session_config: Arc<SessionConfig>,
}

impl<U, S> CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        session_config: Arc<SessionConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_config,
        }
    }

    /// Resolve the authenticated user, if the session has one bound.
    ///
    /// The user row is re-read so a disabled account loses access
    /// immediately, not at session expiry.
    pub async fn execute(
        &self,
        token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthenticatedUser>> {
        let session_check =
            SessionCheck::new(self.session_repo.clone(), self.session_config.clone());

        let Some(session) = session_check.current_session(token, fingerprint_hash).await? else {
            return Ok(None);
        };

        let (Some(user_id), Some(role)) = (session.user_id, session.user_role) else {
            return Ok(None);
        };

        let Some(user) = self.user_repo.find_by_id(&UserId::from_uuid(user_id)).await? else {
            return Ok(None);
        };

        if !user.can_login() {
            return Ok(None);
        }

        Ok(Some(AuthenticatedUser {
            actor: Actor::new(user_id, role),
            public_id: user.public_id.to_string(),
            user_name: user.user_name.original().to_string(),
        }))
    }
}
