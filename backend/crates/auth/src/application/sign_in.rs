//! Sign In Use Case
//!
//! Authenticates a user and binds them to the request's session record.
//! The CAPTCHA gate has already been passed by the time this runs (the
//! `require_human` middleware consumed the pass).

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::domain::value_object::{UserRole, user_name::UserName};
use crate::error::{AuthError, AuthResult};
use platform::password::{ClearTextPassword, verify_password};
use session::domain::repository::SessionRepository;
use uuid::Uuid;

/// Sign in input
pub struct SignInInput {
    pub user_name: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub public_id: String,
    pub role: UserRole,
}

/// Sign in use case
pub struct SignInUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, C, S> SignInUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        credential_repo: Arc<C>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            credential_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput, session_id: Uuid) -> AuthResult<SignInOutput> {
        // Unknown names and wrong passwords are indistinguishable to the client
        let user_name =
            UserName::new(&input.user_name).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credential not found".to_string()))?;

        if credential.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let password_valid =
            verify_password(&password, self.config.pepper(), &credential.password_hash)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !password_valid {
            credential.record_failure();
            self.credential_repo.update(&credential).await?;
            return Err(AuthError::InvalidCredentials);
        }

        // Reset failure state and stamp the login
        credential.reset_failures();
        self.credential_repo.update(&credential).await?;

        let mut user = user;
        user.record_login();
        self.user_repo.update(&user).await?;

        // Bind the authenticated user to the session record
        self.session_repo
            .bind_user(session_id, user.user_id.into_uuid(), user.user_role)
            .await?;

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session_id,
            role = %user.user_role,
            "User signed in"
        );

        Ok(SignInOutput {
            public_id: user.public_id.to_string(),
            role: user.user_role,
        })
    }
}
