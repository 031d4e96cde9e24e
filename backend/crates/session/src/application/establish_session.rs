//! Establish Session Use Case
//!
//! Sessions are created on first request: if the `sid` cookie carries a
//! valid, live session the use case reuses it; otherwise it creates a
//! fresh anonymous row and hands back a token for a new cookie.

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::entities::Session;
use crate::domain::repository::SessionRepository;
use crate::error::{SessionError, SessionResult};
use platform::client::ClientFingerprint;
use platform::crypto::{random_bytes, to_base64_url};
use platform::token::{create_session_token, verify_session_token};

/// Result of establishing a session
pub struct EstablishedSession {
    pub session: Session,
    /// Token for a new `sid` cookie; None when an existing session was reused
    pub new_cookie_token: Option<String>,
}

/// Establish Session Use Case
pub struct EstablishSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<SessionConfig>,
}

impl<S> EstablishSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<SessionConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Get the live session for the request, or create one.
    pub async fn execute(
        &self,
        cookie_token: Option<&str>,
        fingerprint: &ClientFingerprint,
    ) -> SessionResult<EstablishedSession> {
        if let Some(token) = cookie_token {
            if let Some(session_id) = verify_session_token(token, &self.config.session_secret) {
                match self.session_repo.get(session_id, &fingerprint.hash).await {
                    Ok(Some(session)) => {
                        return Ok(EstablishedSession {
                            session,
                            new_cookie_token: None,
                        });
                    }
                    Ok(None) => {}
                    // A hijacked cookie gets a fresh session, not an error
                    Err(SessionError::SessionFingerprintMismatch) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        let session = Session::new(
            generate_csrf_token(),
            fingerprint.hash_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            self.config.session_ttl_ms(),
        );

        self.session_repo.create(&session).await?;

        let token = create_session_token(session.session_id, &self.config.session_secret);

        tracing::info!(session_id = %session.session_id, "Session established");

        Ok(EstablishedSession {
            session,
            new_cookie_token: Some(token),
        })
    }
}

/// Generate a fresh CSRF token (session-scoped, never process-wide)
pub fn generate_csrf_token() -> String {
    to_base64_url(&random_bytes(32))
}
