//! Register Use Case
//!
//! Creates a new account. Only self-service roles can be chosen here;
//! admin roles are assigned out of band.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{credential::Credential, user::User};
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::domain::value_object::{UserRole, user_name::UserName};
use crate::error::{AuthError, AuthResult};
use platform::password::{ClearTextPassword, hash_password};

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub password: String,
    /// Role code: student, training_center or testing_center
    pub role: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub public_id: String,
}

/// Register use case
pub struct RegisterUseCase<U, C>
where
    U: UserRepository,
    C: CredentialRepository,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<U, C> RegisterUseCase<U, C>
where
    U: UserRepository,
    C: CredentialRepository,
{
    pub fn new(user_repo: Arc<U>, credential_repo: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            credential_repo,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Validate role: admin roles are never self-service
        let role = UserRole::from_code(&input.role).ok_or_else(|| AuthError::Validation {
            field: "role",
            message: format!("unknown role '{}'", input.role),
        })?;

        if !role.is_self_service() {
            return Err(AuthError::RoleNotPermitted(role.code().to_string()));
        }

        // Validate user name
        let user_name = UserName::new(&input.user_name).map_err(|e| AuthError::Validation {
            field: "userName",
            message: e.to_string(),
        })?;

        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }

        // Validate and hash password
        let password =
            ClearTextPassword::new(input.password).map_err(|e| AuthError::Validation {
                field: "password",
                message: e.to_string(),
            })?;
        let password_hash = hash_password(&password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        // Persist
        let user = User::new(user_name, role);
        let credential = Credential::new(user.user_id, password_hash);

        self.user_repo.create(&user).await?;
        self.credential_repo.create(&credential).await?;

        tracing::info!(
            public_id = %user.public_id,
            user_name = %user.user_name,
            role = %user.user_role,
            "User registered"
        );

        Ok(RegisterOutput {
            public_id: user.public_id.to_string(),
        })
    }
}
