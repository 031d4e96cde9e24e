//! Unit tests for the session/CAPTCHA gate
//!
//! Use cases are exercised against an in-memory repository that mirrors
//! the PostgreSQL semantics (compare-and-swap consumption, attempt
//! decrement, pass freshness).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::SessionConfig;
use crate::application::issue_challenge::IssueChallengeUseCase;
use crate::application::verify_challenge::{VerifyChallengeInput, VerifyChallengeUseCase};
use crate::domain::entities::{CaptchaChallenge, Session};
use crate::domain::repository::{
    ChallengeRateLimitRepository, SessionRepository,
};
use crate::domain::value_objects::{VerifyFailure, VerifyOutcome};
use crate::error::{SessionError, SessionResult};
use kernel::role::UserRole;
use platform::client::ClientFingerprint;
use platform::token::create_session_token;

// ============================================================================
// In-memory repository
// ============================================================================

#[derive(Clone, Default)]
struct MemoryStore {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    issue_count: Arc<Mutex<u32>>,
}

impl SessionRepository for MemoryStore {
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
        session_id: Uuid,
        challenge: &CaptchaChallenge,
        csrf_token: &str,
    ) -> SessionResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionInvalid)?;
        session.challenge = Some(challenge.clone());
        session.csrf_token = csrf_token.to_string();
        Ok(())
    }

    async fn consume_challenge(
        &self,
        session_id: Uuid,
        challenge_id: Uuid,
        passed_at_ms: i64,
    ) -> SessionResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.get_mut(&session_id) else {
            return Ok(false);
        };
        match &session.challenge {
            Some(challenge) if challenge.id == challenge_id => {
                session.challenge = None;
                session.captcha_passed_at_ms = Some(passed_at_ms);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_failed_attempt(
        &self,
        session_id: Uuid,
        challenge_id: Uuid,
    ) -> SessionResult<i16> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.get_mut(&session_id) else {
            return Ok(0);
        };
        let Some(challenge) = &mut session.challenge else {
            return Ok(0);
        };
        if challenge.id != challenge_id || challenge.attempts_left <= 0 {
            return Ok(0);
        }
        challenge.attempts_left -= 1;
        let remaining = challenge.attempts_left;
        if remaining == 0 {
            session.challenge = None;
        }
        Ok(remaining)
    }

    async fn consume_captcha_pass(
        &self,
        session_id: Uuid,
        not_before_ms: i64,
    ) -> SessionResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.get_mut(&session_id) else {
            return Ok(false);
        };
        match session.captcha_passed_at_ms {
            Some(passed_at) if passed_at >= not_before_ms => {
                session.captcha_passed_at_ms = None;
                Ok(true)
            }
            _ => Ok(false),
        }
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
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

impl ChallengeRateLimitRepository for MemoryStore {
    async fn check(
        &self,
        _fingerprint: &ClientFingerprint,
        max_requests: u32,
        _window_ms: i64,
    ) -> SessionResult<bool> {
        let mut count = self.issue_count.lock().unwrap();
        *count += 1;
        Ok(*count <= max_requests)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const FP_HASH: [u8; 32] = [5u8; 32];

fn fingerprint() -> ClientFingerprint {
    ClientFingerprint::new(FP_HASH, None, Some("test-agent".to_string()))
}

fn test_config() -> Arc<SessionConfig> {
    Arc::new(SessionConfig {
        session_secret: [7u8; 32],
        cookie_secure: false,
        ..SessionConfig::default()
    })
}

struct Fixture {
    store: Arc<MemoryStore>,
    config: Arc<SessionConfig>,
    token: String,
    session_id: Uuid,
}

/// Seed a session holding a challenge with a known answer.
async fn seeded(answer: &str, ttl_ms: i64) -> (Fixture, Uuid) {
    let store = Arc::new(MemoryStore::default());
    let config = test_config();

    let session = Session::new(
        "csrf-token".to_string(),
        FP_HASH.to_vec(),
        None,
        Some("test-agent".to_string()),
        config.session_ttl_ms(),
    );
    let session_id = session.session_id;
    store.create(&session).await.unwrap();

    let challenge =
        CaptchaChallenge::new(answer.to_string(), ttl_ms, config.captcha_max_attempts);
    let challenge_id = challenge.id;
    store
        .put_challenge(session_id, &challenge, "csrf-token")
        .await
        .unwrap();

    let token = create_session_token(session_id, &config.session_secret);

    (
        Fixture {
            store,
            config,
            token,
            session_id,
        },
        challenge_id,
    )
}

fn verify_input(input: &str) -> VerifyChallengeInput {
    VerifyChallengeInput {
        captcha_input: input.to_string(),
        csrf_token: None,
    }
}

async fn verify(fx: &Fixture, input: VerifyChallengeInput) -> VerifyOutcome {
    let use_case = VerifyChallengeUseCase::new(fx.store.clone(), fx.config.clone());
    use_case
        .execute(Some(&fx.token), &fingerprint(), input)
        .await
        .unwrap()
}

// ============================================================================
// Verification semantics
// ============================================================================

#[tokio::test]
async fn correct_answer_validates_exactly_once() {
    let (fx, _) = seeded("AB12", 60_000).await;

    assert_eq!(verify(&fx, verify_input("AB12")).await, VerifyOutcome::Passed);

    // Replay of the consumed challenge fails
    assert_eq!(
        verify(&fx, verify_input("AB12")).await,
        VerifyOutcome::Failed(VerifyFailure::NoChallenge)
    );
}

#[tokio::test]
async fn expired_challenge_fails_even_with_correct_answer() {
    let (fx, _) = seeded("AB12", -1_000).await;

    assert_eq!(
        verify(&fx, verify_input("AB12")).await,
        VerifyOutcome::Failed(VerifyFailure::Expired)
    );
}

#[tokio::test]
async fn validation_is_case_insensitive() {
    let (fx, _) = seeded("AB12", 60_000).await;

    assert_eq!(verify(&fx, verify_input("ab12")).await, VerifyOutcome::Passed);
}

#[tokio::test]
async fn wrong_answer_keeps_challenge_for_remaining_attempts() {
    let (fx, _) = seeded("AB12", 60_000).await;

    assert_eq!(
        verify(&fx, verify_input("ZZZZ")).await,
        VerifyOutcome::Failed(VerifyFailure::WrongAnswer)
    );

    // Challenge not deleted on failure: the correct answer still works
    assert_eq!(verify(&fx, verify_input("AB12")).await, VerifyOutcome::Passed);
}

#[tokio::test]
async fn attempts_exhaustion_clears_challenge() {
    let (fx, _) = seeded("AB12", 60_000).await;

    for _ in 0..fx.config.captcha_max_attempts {
        assert_eq!(
            verify(&fx, verify_input("WRONG")).await,
            VerifyOutcome::Failed(VerifyFailure::WrongAnswer)
        );
    }

    // Exhausted: even the correct answer is refused until reissue
    assert_eq!(
        verify(&fx, verify_input("AB12")).await,
        VerifyOutcome::Failed(VerifyFailure::NoChallenge)
    );
}

#[tokio::test]
async fn missing_session_fails_closed() {
    let (fx, _) = seeded("AB12", 60_000).await;

    let use_case = VerifyChallengeUseCase::new(fx.store.clone(), fx.config.clone());

    // No cookie at all
    let outcome = use_case
        .execute(None, &fingerprint(), verify_input("AB12"))
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Failed(VerifyFailure::NoSession));

    // Tampered token
    let outcome = use_case
        .execute(Some("garbage.token"), &fingerprint(), verify_input("AB12"))
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Failed(VerifyFailure::NoSession));
}

#[tokio::test]
async fn fingerprint_mismatch_fails_closed() {
    let (fx, _) = seeded("AB12", 60_000).await;

    let other = ClientFingerprint::new([9u8; 32], None, Some("other-agent".to_string()));
    let use_case = VerifyChallengeUseCase::new(fx.store.clone(), fx.config.clone());
    let outcome = use_case
        .execute(Some(&fx.token), &other, verify_input("AB12"))
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Failed(VerifyFailure::NoSession));
}

#[tokio::test]
async fn csrf_header_must_match_when_present() {
    let (fx, _) = seeded("AB12", 60_000).await;

    let outcome = verify(
        &fx,
        VerifyChallengeInput {
            captcha_input: "AB12".to_string(),
            csrf_token: Some("wrong-token".to_string()),
        },
    )
    .await;
    assert_eq!(outcome, VerifyOutcome::Failed(VerifyFailure::CsrfMismatch));

    let outcome = verify(
        &fx,
        VerifyChallengeInput {
            captcha_input: "AB12".to_string(),
            csrf_token: Some("csrf-token".to_string()),
        },
    )
    .await;
    assert_eq!(outcome, VerifyOutcome::Passed);
}

#[tokio::test]
async fn reissue_overwrites_pending_challenge() {
    let (fx, first_challenge_id) = seeded("AB12", 60_000).await;

    // A second issuance replaces the pending challenge (last write wins)
    let replacement = CaptchaChallenge::new("XY79".to_string(), 60_000, 3);
    fx.store
        .put_challenge(fx.session_id, &replacement, "rotated-csrf")
        .await
        .unwrap();

    // The first challenge can no longer be consumed
    let consumed = fx
        .store
        .consume_challenge(fx.session_id, first_challenge_id, 0)
        .await
        .unwrap();
    assert!(!consumed);

    // The old answer no longer validates; the new one does
    assert_eq!(
        verify(&fx, verify_input("AB12")).await,
        VerifyOutcome::Failed(VerifyFailure::WrongAnswer)
    );
    assert_eq!(verify(&fx, verify_input("XY79")).await, VerifyOutcome::Passed);
}

// ============================================================================
// Human pass semantics
// ============================================================================

#[tokio::test]
async fn captcha_pass_is_single_use() {
    let (fx, _) = seeded("AB12", 60_000).await;

    assert_eq!(verify(&fx, verify_input("AB12")).await, VerifyOutcome::Passed);

    let check = CheckSessionUseCase::new(fx.store.clone(), fx.config.clone());

    assert!(check.consume_captcha_pass(&fx.token).await.unwrap());
    // Second sensitive action needs a fresh challenge
    assert!(!check.consume_captcha_pass(&fx.token).await.unwrap());
}

#[tokio::test]
async fn stale_captcha_pass_is_refused() {
    let (fx, _) = seeded("AB12", 60_000).await;

    // Record a pass far in the past, beyond the freshness window
    let stale = Utc::now().timestamp_millis() - fx.config.captcha_pass_ttl_ms() - 1_000;
    {
        let mut sessions = fx.store.sessions.lock().unwrap();
        sessions.get_mut(&fx.session_id).unwrap().captcha_passed_at_ms = Some(stale);
    }

    let check = CheckSessionUseCase::new(fx.store.clone(), fx.config.clone());
    assert!(!check.consume_captcha_pass(&fx.token).await.unwrap());
}

// ============================================================================
// Issuance
// ============================================================================

#[tokio::test]
async fn issue_establishes_session_and_stores_challenge() {
    let store = Arc::new(MemoryStore::default());
    let config = test_config();

    let use_case = IssueChallengeUseCase::new(store.clone(), store.clone(), config.clone());
    let output = use_case.execute(None, fingerprint()).await.unwrap();

    // New session means a new cookie
    let token = output.new_cookie_token.expect("expected a new sid cookie");
    assert!(output.image_data_uri.starts_with("data:image/png;base64,"));

    // The stored answer has the configured length and is never in the output
    let sessions = store.sessions.lock().unwrap();
    let session = sessions.values().next().unwrap();
    let challenge = session.challenge.as_ref().unwrap();
    assert_eq!(challenge.answer.len(), config.captcha_answer_len.get());
    assert!(!output.image_data_uri.contains(&challenge.answer));
    assert_eq!(session.csrf_token, output.csrf_token);
    drop(sessions);

    // Reusing the cookie does not create a second session
    let output2 = use_case.execute(Some(&token), fingerprint()).await.unwrap();
    assert!(output2.new_cookie_token.is_none());
    assert_eq!(store.sessions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn issue_rotates_csrf_and_replaces_challenge() {
    let store = Arc::new(MemoryStore::default());
    let config = test_config();

    let use_case = IssueChallengeUseCase::new(store.clone(), store.clone(), config.clone());
    let first = use_case.execute(None, fingerprint()).await.unwrap();
    let token = first.new_cookie_token.clone().unwrap();

    let second = use_case.execute(Some(&token), fingerprint()).await.unwrap();

    assert_ne!(first.challenge_id, second.challenge_id);
    assert_ne!(first.csrf_token, second.csrf_token);

    let sessions = store.sessions.lock().unwrap();
    let session = sessions.values().next().unwrap();
    assert_eq!(session.challenge.as_ref().unwrap().id, second.challenge_id);
}

// ============================================================================
// Error taxonomy
// ============================================================================

#[test]
fn error_status_codes_match_taxonomy() {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    let cases: Vec<(SessionError, StatusCode)> = vec![
        (SessionError::SessionInvalid, StatusCode::UNAUTHORIZED),
        (
            SessionError::SessionFingerprintMismatch,
            StatusCode::UNAUTHORIZED,
        ),
        (SessionError::ChallengeExpired, StatusCode::GONE),
        (SessionError::RateLimitExceeded, StatusCode::TOO_MANY_REQUESTS),
        (SessionError::CaptchaRequired, StatusCode::FORBIDDEN),
        (
            SessionError::MissingHeader("User-Agent".into()),
            StatusCode::BAD_REQUEST,
        ),
        (
            SessionError::Internal("test".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.status_code(), expected);
        let response = error.into_response();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn issue_is_rate_limited() {
    let store = Arc::new(MemoryStore::default());
    let config = Arc::new(SessionConfig {
        rate_limit_max_requests: 2,
        ..(*test_config()).clone()
    });

    let use_case = IssueChallengeUseCase::new(store.clone(), store.clone(), config);

    assert!(use_case.execute(None, fingerprint()).await.is_ok());
    assert!(use_case.execute(None, fingerprint()).await.is_ok());

    let err = use_case.execute(None, fingerprint()).await.unwrap_err();
    assert!(matches!(err, SessionError::RateLimitExceeded));
}
