//! Check Session Use Case
//!
//! Resolves the session behind a `sid` token and consumes the human pass
//! for sensitive actions.

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::entities::Session;
use crate::domain::repository::SessionRepository;
use crate::error::SessionResult;
use chrono::Utc;
use platform::token::verify_session_token;

/// Check Session Use Case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<SessionConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<SessionConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Resolve the live session behind a token, verifying the fingerprint.
    pub async fn current_session(
        &self,
        token: &str,
        fingerprint_hash: &[u8],
    ) -> SessionResult<Option<Session>> {
        let Some(session_id) = verify_session_token(token, &self.config.session_secret) else {
            return Ok(None);
        };

        self.session_repo.get(session_id, fingerprint_hash).await
    }

    /// Atomically consume the human pass for a sensitive action.
    ///
    /// Each login or registration attempt needs its own solved challenge:
    /// a consumed pass is gone even if the action itself fails.
    pub async fn consume_captcha_pass(&self, token: &str) -> SessionResult<bool> {
        let Some(session_id) = verify_session_token(token, &self.config.session_secret) else {
            return Ok(false);
        };

        let not_before = Utc::now().timestamp_millis() - self.config.captcha_pass_ttl_ms();

        self.session_repo
            .consume_captcha_pass(session_id, not_before)
            .await
    }

    /// Destroy the session behind a token (logout).
    pub async fn destroy(&self, token: &str) -> SessionResult<()> {
        if let Some(session_id) = verify_session_token(token, &self.config.session_secret) {
            self.session_repo.delete(session_id).await?;
            tracing::info!(session_id = %session_id, "Session destroyed");
        }
        Ok(())
    }
}
