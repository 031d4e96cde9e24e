//! Issue Challenge Use Case

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::application::establish_session::{
    EstablishSessionUseCase, generate_csrf_token,
};
use crate::domain::captcha_image::{render_answer_png, to_data_uri};
use crate::domain::entities::CaptchaChallenge;
use crate::domain::repository::{ChallengeRateLimitRepository, SessionRepository};
use crate::domain::services::generate_answer;
use crate::error::{SessionError, SessionResult};
use platform::client::ClientFingerprint;

/// Output DTO for issue challenge
#[derive(Debug, Clone)]
pub struct IssueChallengeOutput {
    pub challenge_id: uuid::Uuid,
    pub image_data_uri: String,
    pub csrf_token: String,
    pub expires_at_ms: i64,
    /// Token for a new `sid` cookie when a session was just established
    pub new_cookie_token: Option<String>,
}

/// Issue Challenge Use Case
pub struct IssueChallengeUseCase<S, R>
where
    S: SessionRepository,
    R: ChallengeRateLimitRepository,
{
    session_repo: Arc<S>,
    rate_limit_repo: Arc<R>,
    config: Arc<SessionConfig>,
}

impl<S, R> IssueChallengeUseCase<S, R>
where
    S: SessionRepository,
    R: ChallengeRateLimitRepository,
{
    pub fn new(session_repo: Arc<S>, rate_limit_repo: Arc<R>, config: Arc<SessionConfig>) -> Self {
        Self {
            session_repo,
            rate_limit_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        cookie_token: Option<&str>,
        fingerprint: ClientFingerprint,
    ) -> SessionResult<IssueChallengeOutput> {
        // Check rate limit before touching session state
        let allowed = self
            .rate_limit_repo
            .check(
                &fingerprint,
                self.config.rate_limit_max_requests,
                self.config.rate_limit_window_ms(),
            )
            .await?;

        if !allowed {
            return Err(SessionError::RateLimitExceeded);
        }

        // Sessions are created on first request
        let establish =
            EstablishSessionUseCase::new(self.session_repo.clone(), self.config.clone());
        let established = establish.execute(cookie_token, &fingerprint).await?;

        // Generate the answer and render it; the answer stays server-side.
        // The rng is scoped so it is not held across await points.
        let (answer, png) = {
            let mut rng = rand::rng();
            let answer = generate_answer(self.config.captcha_answer_len.get(), &mut rng);
            let png = render_answer_png(&answer, &mut rng).map_err(SessionError::ImageRender)?;
            (answer, png)
        };

        let challenge = CaptchaChallenge::new(
            answer,
            self.config.captcha_ttl_ms(),
            self.config.captcha_max_attempts,
        );

        // Overwrites any prior unconsumed challenge and rotates the CSRF token
        let csrf_token = generate_csrf_token();
        self.session_repo
            .put_challenge(established.session.session_id, &challenge, &csrf_token)
            .await?;

        tracing::info!(
            session_id = %established.session.session_id,
            challenge_id = %challenge.id,
            "Issued CAPTCHA challenge"
        );

        Ok(IssueChallengeOutput {
            challenge_id: challenge.id,
            image_data_uri: to_data_uri(&png),
            csrf_token,
            expires_at_ms: challenge.expires_at_ms,
            new_cookie_token: established.new_cookie_token,
        })
    }
}
