//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entities::{CaptchaChallenge, Session};
use crate::error::SessionResult;
use kernel::role::UserRole;
use platform::client::ClientFingerprint;
use uuid::Uuid;

/// Session repository trait
///
/// The session row is the one shared mutable resource of the gate.
/// Challenge consumption and pass consumption are compare-and-swap style
/// operations so that concurrent requests cannot double-spend.
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create(&self, session: &Session) -> SessionResult<()>;

    /// Get a live session by ID and verify the client fingerprint
    async fn get(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> SessionResult<Option<Session>>;

    /// Store a challenge on the session, overwriting any previous one,
    /// and rotate the CSRF token (last write wins)
    async fn put_challenge(
        &self,
        session_id: Uuid,
        challenge: &CaptchaChallenge,
        csrf_token: &str,
    ) -> SessionResult<()>;

    /// Atomically clear the identified challenge and record the human
    /// pass. Returns false if the challenge was already consumed or
    /// replaced (single-use invariant).
    async fn consume_challenge(
        &self,
        session_id: Uuid,
        challenge_id: Uuid,
        passed_at_ms: i64,
    ) -> SessionResult<bool>;

    /// Decrement the attempt counter of the identified challenge.
    /// Returns the attempts left; at zero the challenge is cleared.
    async fn record_failed_attempt(
        &self,
        session_id: Uuid,
        challenge_id: Uuid,
    ) -> SessionResult<i16>;

    /// Atomically take the human pass if it is fresh enough.
    /// Returns false when there is no pass or it is stale (single use).
    async fn consume_captcha_pass(
        &self,
        session_id: Uuid,
        not_before_ms: i64,
    ) -> SessionResult<bool>;

    /// Bind an authenticated user to the session (login)
    async fn bind_user(&self, session_id: Uuid, user_id: Uuid, role: UserRole)
    -> SessionResult<()>;

    /// Update last-activity timestamp
    async fn touch(&self, session_id: Uuid) -> SessionResult<()>;

    /// Destroy a session (logout)
    async fn delete(&self, session_id: Uuid) -> SessionResult<()>;

    /// Remove expired sessions; returns the number deleted
    async fn cleanup_expired(&self) -> SessionResult<u64>;
}

/// Rate limit repository for challenge issuance
#[trait_variant::make(ChallengeRateLimitRepository: Send)]
pub trait LocalChallengeRateLimitRepository {
    /// Check rate limit for a fingerprint.
    /// Returns true if the request is allowed.
    async fn check(
        &self,
        fingerprint: &ClientFingerprint,
        max_requests: u32,
        window_ms: i64,
    ) -> SessionResult<bool>;
}
