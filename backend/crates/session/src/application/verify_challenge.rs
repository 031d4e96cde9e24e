//! Verify Challenge Use Case
//!
//! Fails closed: no session, no stored challenge, expired challenge,
//! exhausted attempts or CSRF mismatch all come back as a `Failed`
//! outcome. Only infrastructure problems are errors.

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::services::answers_match;
use crate::domain::value_objects::{VerifyFailure, VerifyOutcome};
use crate::error::{SessionError, SessionResult};
use chrono::Utc;
use platform::client::ClientFingerprint;
use platform::crypto::constant_time_eq;
use platform::token::verify_session_token;

/// Input DTO for verify challenge
#[derive(Debug, Clone)]
pub struct VerifyChallengeInput {
    pub captcha_input: String,
    /// Value of the X-CSRF-Token header, when the client sent one
    pub csrf_token: Option<String>,
}

/// Verify Challenge Use Case
pub struct VerifyChallengeUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<SessionConfig>,
}

impl<S> VerifyChallengeUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<SessionConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        cookie_token: Option<&str>,
        fingerprint: &ClientFingerprint,
        input: VerifyChallengeInput,
    ) -> SessionResult<VerifyOutcome> {
        let outcome = self.validate(cookie_token, fingerprint, input).await?;

        if let VerifyOutcome::Failed(reason) = outcome {
            tracing::info!(reason = reason.as_str(), "CAPTCHA validation failed");
        }

        Ok(outcome)
    }

    async fn validate(
        &self,
        cookie_token: Option<&str>,
        fingerprint: &ClientFingerprint,
        input: VerifyChallengeInput,
    ) -> SessionResult<VerifyOutcome> {
        let Some(token) = cookie_token else {
            return Ok(VerifyOutcome::Failed(VerifyFailure::NoSession));
        };

        let Some(session_id) = verify_session_token(token, &self.config.session_secret) else {
            return Ok(VerifyOutcome::Failed(VerifyFailure::NoSession));
        };

        let session = match self.session_repo.get(session_id, &fingerprint.hash).await {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(VerifyOutcome::Failed(VerifyFailure::NoSession)),
            Err(SessionError::SessionFingerprintMismatch) => {
                return Ok(VerifyOutcome::Failed(VerifyFailure::NoSession));
            }
            Err(e) => return Err(e),
        };

        let Some(challenge) = session.challenge else {
            return Ok(VerifyOutcome::Failed(VerifyFailure::NoChallenge));
        };

        // Expiry is checked at validation time, not actively swept
        if challenge.is_expired() {
            return Ok(VerifyOutcome::Failed(VerifyFailure::Expired));
        }

        if challenge.attempts_left <= 0 {
            return Ok(VerifyOutcome::Failed(VerifyFailure::AttemptsExhausted));
        }

        // The header is optional on the wire; when present it must match
        // the token issued with this challenge
        if let Some(provided) = &input.csrf_token {
            if !constant_time_eq(provided.as_bytes(), session.csrf_token.as_bytes()) {
                return Ok(VerifyOutcome::Failed(VerifyFailure::CsrfMismatch));
            }
        }

        if !answers_match(&challenge.answer, &input.captcha_input) {
            let remaining = self
                .session_repo
                .record_failed_attempt(session_id, challenge.id)
                .await?;
            tracing::debug!(
                session_id = %session_id,
                attempts_left = remaining,
                "Wrong CAPTCHA answer"
            );
            return Ok(VerifyOutcome::Failed(VerifyFailure::WrongAnswer));
        }

        // Single-use: the challenge is removed before success is reported.
        // The compare-and-swap loses against a concurrent consume or a
        // concurrent re-issue, in which case this attempt fails.
        let consumed = self
            .session_repo
            .consume_challenge(session_id, challenge.id, Utc::now().timestamp_millis())
            .await?;

        if !consumed {
            return Ok(VerifyOutcome::Failed(VerifyFailure::AlreadyConsumed));
        }

        tracing::info!(session_id = %session_id, challenge_id = %challenge.id, "CAPTCHA passed");

        Ok(VerifyOutcome::Passed)
    }
}
