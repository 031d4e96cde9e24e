//! Unit tests for the auth crate
//!
//! Use cases run against in-memory repositories; password hashing uses
//! the real Argon2id path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::domain::entity::credential::{Credential, MAX_LOGIN_FAILURES};
use crate::domain::entity::user::User;
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::domain::value_object::{
    UserId, UserRole, public_id::PublicId, user_name::UserName, user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};
use kernel::role::Actor;
use platform::token::create_session_token;
use session::domain::entities::{CaptchaChallenge, Session};
use session::domain::repository::SessionRepository;
use session::error::{SessionError, SessionResult};
use session::SessionConfig;

// ============================================================================
// In-memory repositories
// ============================================================================

#[derive(Clone, Default)]
struct MemoryAuthStore {
    users: Arc<Mutex<Vec<User>>>,
    credentials: Arc<Mutex<HashMap<Uuid, Credential>>>,
}

impl UserRepository for MemoryAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == *user_id)
            .cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.public_id == *public_id)
            .cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.user_name.canonical() == user_name.canonical()))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.user_id == user.user_id) {
            *existing = user.clone();
        }
        Ok(())
    }
}

impl CredentialRepository for MemoryAuthStore {
    async fn create(&self, credential: &Credential) -> AuthResult<()> {
        self.credentials
            .lock()
            .unwrap()
            .insert(credential.user_id.into_uuid(), credential.clone());
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .get(user_id.as_uuid())
            .cloned())
    }

    async fn update(&self, credential: &Credential) -> AuthResult<()> {
        self.credentials
            .lock()
            .unwrap()
            .insert(credential.user_id.into_uuid(), credential.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionRepository for MemorySessionStore {
    async fn create(&self, session: &Session) -> SessionResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> SessionResult<Option<Session>> {
        let sessions = self.sessions.lock().unwrap();
        match sessions.get(&session_id) {
            Some(session) if session.is_expired() => Ok(None),
            Some(session) => {
                if session.client_fingerprint_hash != fingerprint_hash {
                    return Err(SessionError::SessionFingerprintMismatch);
                }
                Ok(Some(session.clone()))
            }
            None => Ok(None),
        }
    }

    async fn put_challenge(
        &self,
        _session_id: Uuid,
        _challenge: &CaptchaChallenge,
        _csrf_token: &str,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn consume_challenge(
        &self,
        _session_id: Uuid,
        _challenge_id: Uuid,
        _passed_at_ms: i64,
    ) -> SessionResult<bool> {
        Ok(false)
    }

    async fn record_failed_attempt(
        &self,
        _session_id: Uuid,
        _challenge_id: Uuid,
    ) -> SessionResult<i16> {
        Ok(0)
    }

    async fn consume_captcha_pass(
        &self,
        _session_id: Uuid,
        _not_before_ms: i64,
    ) -> SessionResult<bool> {
        Ok(false)
    }

    async fn bind_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> SessionResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionInvalid)?;
        session.user_id = Some(user_id);
        session.user_role = Some(role);
        Ok(())
    }

    async fn touch(&self, _session_id: Uuid) -> SessionResult<()> {
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> SessionResult<()> {
        self.sessions.lock().unwrap().remove(&session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        Ok(0)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const FP_HASH: [u8; 32] = [5u8; 32];
const PASSWORD: &str = "correct horse battery";

fn auth_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::default())
}

fn session_config() -> Arc<SessionConfig> {
    Arc::new(SessionConfig {
        session_secret: [7u8; 32],
        ..SessionConfig::default()
    })
}

async fn register_user(
    store: &Arc<MemoryAuthStore>,
    user_name: &str,
    role: &str,
) -> AuthResult<String> {
    let use_case = RegisterUseCase::new(store.clone(), store.clone(), auth_config());
    use_case
        .execute(RegisterInput {
            user_name: user_name.to_string(),
            password: PASSWORD.to_string(),
            role: role.to_string(),
        })
        .await
        .map(|out| out.public_id)
}

async fn seeded_session(store: &Arc<MemorySessionStore>, config: &SessionConfig) -> (Uuid, String) {
    let session = Session::new(
        "csrf".to_string(),
        FP_HASH.to_vec(),
        None,
        Some("test-agent".to_string()),
        config.session_ttl_ms(),
    );
    let session_id = session.session_id;
    store.create(&session).await.unwrap();
    let token = create_session_token(session_id, &config.session_secret);
    (session_id, token)
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_creates_user_and_credential() {
    let store = Arc::new(MemoryAuthStore::default());

    let public_id = register_user(&store, "riyadh_center", "training_center")
        .await
        .unwrap();
    assert_eq!(public_id.len(), 21);

    let users = store.users.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user_role, UserRole::TrainingCenter);

    let credentials = store.credentials.lock().unwrap();
    let credential = credentials.get(users[0].user_id.as_uuid()).unwrap();
    // Stored as a PHC hash, never as plaintext
    assert!(credential.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn register_refuses_duplicate_name() {
    let store = Arc::new(MemoryAuthStore::default());

    register_user(&store, "riyadh_center", "training_center")
        .await
        .unwrap();
    let err = register_user(&store, "Riyadh_Center", "testing_center")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNameTaken));
}

#[tokio::test]
async fn register_refuses_admin_roles() {
    let store = Arc::new(MemoryAuthStore::default());

    for role in ["admin", "super_admin"] {
        let err = register_user(&store, "wannabe_admin", role).await.unwrap_err();
        assert!(matches!(err, AuthError::RoleNotPermitted(_)));
    }

    let err = register_user(&store, "someone", "nonsense").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation { field: "role", .. }));
}

#[tokio::test]
async fn register_reports_field_errors() {
    let store = Arc::new(MemoryAuthStore::default());
    let use_case = RegisterUseCase::new(store.clone(), store.clone(), auth_config());

    let err = use_case
        .execute(RegisterInput {
            user_name: "x".to_string(),
            password: PASSWORD.to_string(),
            role: "student".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation { field: "userName", .. }));

    let err = use_case
        .execute(RegisterInput {
            user_name: "student1".to_string(),
            password: "short".to_string(),
            role: "student".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation { field: "password", .. }));
}

// ============================================================================
// Sign in
// ============================================================================

#[tokio::test]
async fn sign_in_binds_user_to_session() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    register_user(&auth_store, "riyadh_center", "training_center")
        .await
        .unwrap();
    let (session_id, _) = seeded_session(&session_store, &config).await;

    let use_case = SignInUseCase::new(
        auth_store.clone(),
        auth_store.clone(),
        session_store.clone(),
        auth_config(),
    );

    let output = use_case
        .execute(
            SignInInput {
                user_name: "riyadh_center".to_string(),
                password: PASSWORD.to_string(),
            },
            session_id,
        )
        .await
        .unwrap();
    assert_eq!(output.role, UserRole::TrainingCenter);

    let sessions = session_store.sessions.lock().unwrap();
    let session = sessions.get(&session_id).unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.user_role, Some(UserRole::TrainingCenter));
}

#[tokio::test]
async fn sign_in_locks_after_repeated_failures() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    register_user(&auth_store, "student1", "student").await.unwrap();
    let (session_id, _) = seeded_session(&session_store, &config).await;

    let use_case = SignInUseCase::new(
        auth_store.clone(),
        auth_store.clone(),
        session_store.clone(),
        auth_config(),
    );

    for _ in 0..MAX_LOGIN_FAILURES {
        let err = use_case
            .execute(
                SignInInput {
                    user_name: "student1".to_string(),
                    password: "wrong password".to_string(),
                },
                session_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // Locked now, even with the right password
    let err = use_case
        .execute(
            SignInInput {
                user_name: "student1".to_string(),
                password: PASSWORD.to_string(),
            },
            session_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked));
}

#[tokio::test]
async fn sign_in_refuses_disabled_account() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    register_user(&auth_store, "student1", "student").await.unwrap();
    {
        let mut users = auth_store.users.lock().unwrap();
        users[0].set_status(UserStatus::Disabled);
    }
    let (session_id, _) = seeded_session(&session_store, &config).await;

    let use_case = SignInUseCase::new(
        auth_store.clone(),
        auth_store.clone(),
        session_store.clone(),
        auth_config(),
    );

    let err = use_case
        .execute(
            SignInInput {
                user_name: "student1".to_string(),
                password: PASSWORD.to_string(),
            },
            session_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountDisabled));
}

#[tokio::test]
async fn unknown_user_and_wrong_password_look_identical() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    register_user(&auth_store, "student1", "student").await.unwrap();
    let (session_id, _) = seeded_session(&session_store, &config).await;

    let use_case = SignInUseCase::new(
        auth_store.clone(),
        auth_store.clone(),
        session_store.clone(),
        auth_config(),
    );

    let err_unknown = use_case
        .execute(
            SignInInput {
                user_name: "nobody".to_string(),
                password: PASSWORD.to_string(),
            },
            session_id,
        )
        .await
        .unwrap_err();
    let err_wrong = use_case
        .execute(
            SignInInput {
                user_name: "student1".to_string(),
                password: "wrong password".to_string(),
            },
            session_id,
        )
        .await
        .unwrap_err();

    assert!(matches!(err_unknown, AuthError::InvalidCredentials));
    assert!(matches!(err_wrong, AuthError::InvalidCredentials));
}

// ============================================================================
// Session resolution
// ============================================================================

#[tokio::test]
async fn check_session_resolves_actor() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    register_user(&auth_store, "riyadh_center", "training_center")
        .await
        .unwrap();
    let (session_id, token) = seeded_session(&session_store, &config).await;

    let sign_in = SignInUseCase::new(
        auth_store.clone(),
        auth_store.clone(),
        session_store.clone(),
        auth_config(),
    );
    sign_in
        .execute(
            SignInInput {
                user_name: "riyadh_center".to_string(),
                password: PASSWORD.to_string(),
            },
            session_id,
        )
        .await
        .unwrap();

    let check = CheckSessionUseCase::new(auth_store.clone(), session_store.clone(), config.clone());
    let user = check.execute(&token, &FP_HASH).await.unwrap().unwrap();

    let expected_id = auth_store.users.lock().unwrap()[0].user_id.into_uuid();
    assert_eq!(
        user.actor,
        Actor::new(expected_id, UserRole::TrainingCenter)
    );
    assert_eq!(user.user_name, "riyadh_center");
}

#[tokio::test]
async fn check_session_rejects_disabled_user_immediately() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    register_user(&auth_store, "student1", "student").await.unwrap();
    let (session_id, token) = seeded_session(&session_store, &config).await;

    let sign_in = SignInUseCase::new(
        auth_store.clone(),
        auth_store.clone(),
        session_store.clone(),
        auth_config(),
    );
    sign_in
        .execute(
            SignInInput {
                user_name: "student1".to_string(),
                password: PASSWORD.to_string(),
            },
            session_id,
        )
        .await
        .unwrap();

    // Disable after login: the live session must stop resolving
    {
        let mut users = auth_store.users.lock().unwrap();
        users[0].set_status(UserStatus::Disabled);
    }

    let check = CheckSessionUseCase::new(auth_store.clone(), session_store.clone(), config.clone());
    assert!(check.execute(&token, &FP_HASH).await.unwrap().is_none());
}

// ============================================================================
// Error taxonomy
// ============================================================================

#[test]
fn error_status_codes_match_taxonomy() {
    use axum::http::StatusCode;

    assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AuthError::UserNameTaken.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        AuthError::InvalidCredentials.status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AuthError::AuthenticationRequired.status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(AuthError::AccountLocked.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AuthError::AccountDisabled.status_code(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AuthError::RoleNotPermitted("admin".into()).status_code(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AuthError::Validation {
            field: "userName",
            message: "too short".into(),
        }
        .status_code(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn check_session_anonymous_session_resolves_none() {
    let auth_store = Arc::new(MemoryAuthStore::default());
    let session_store = Arc::new(MemorySessionStore::default());
    let config = session_config();

    let (_, token) = seeded_session(&session_store, &config).await;

    let check = CheckSessionUseCase::new(auth_store.clone(), session_store.clone(), config.clone());
    assert!(check.execute(&token, &FP_HASH).await.unwrap().is_none());
}
