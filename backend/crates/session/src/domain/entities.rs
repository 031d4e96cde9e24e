//! Domain Entities
//!
//! The server-side session record and the CAPTCHA challenge it may hold.

use chrono::{DateTime, Utc};
use kernel::role::UserRole;
use uuid::Uuid;

/// CAPTCHA challenge held by a session
///
/// At most one pending challenge exists per session; issuing a new one
/// overwrites the previous (last write wins).
#[derive(Debug, Clone)]
pub struct CaptchaChallenge {
    pub id: Uuid,
    /// Plaintext answer. Never serialized to the client.
    pub answer: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at_ms: i64,
    /// Failed attempts remaining before the challenge is cleared
    pub attempts_left: i16,
}

impl CaptchaChallenge {
    pub fn new(answer: String, ttl_ms: i64, max_attempts: i16) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            answer,
            issued_at: now,
            expires_at_ms: now.timestamp_millis() + ttl_ms,
            attempts_left: max_attempts,
        }
    }

    /// Expired challenges always fail validation, regardless of the answer.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}

/// Server-side session record, correlated with the `sid` cookie.
///
/// Created on first request, mutated by CAPTCHA issuance/validation and
/// login, destroyed on logout or expiry.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    /// Authenticated user, if any
    pub user_id: Option<Uuid>,
    /// Role recorded at login time
    pub user_role: Option<UserRole>,
    /// Pending CAPTCHA challenge, if any
    pub challenge: Option<CaptchaChallenge>,
    /// Set when a challenge was solved; consumed by the next sensitive action
    pub captcha_passed_at_ms: Option<i64>,
    /// Rotated on every challenge issuance
    pub csrf_token: String,
    /// Client fingerprint hash (User-Agent based)
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
}

impl Session {
    /// Create a fresh anonymous session.
    pub fn new(
        csrf_token: String,
        fingerprint_hash: Vec<u8>,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl_ms: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id: None,
            user_role: None,
            challenge: None,
            captcha_passed_at_ms: None,
            csrf_token,
            client_fingerprint_hash: fingerprint_hash,
            client_ip,
            user_agent,
            created_at: now,
            last_activity_at: now,
            expires_at_ms: now.timestamp_millis() + ttl_ms,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}
