//! Credential Entity
//!
//! Password hash plus the failure-count/lockout state that turns
//! repeated CAPTCHA-and-password failures into a temporary lock.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::UserId;

/// Failed attempts before the account locks
pub const MAX_LOGIN_FAILURES: i16 = 5;

/// How long a lockout lasts
pub const LOCKOUT_MINUTES: i64 = 15;

/// Credential entity
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: UserId,
    /// Argon2id hash in PHC string format
    pub password_hash: String,
    pub login_failed_count: i16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(user_id: UserId, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Is the account currently locked out?
    pub fn is_locked(&self) -> bool {
        match self.locked_until {
            Some(until) => Utc::now() < until,
            None => false,
        }
    }

    /// Record a failed login attempt; locks the account when the
    /// failure budget is spent.
    pub fn record_failure(&mut self) {
        let now = Utc::now();
        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);

        if self.login_failed_count >= MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
        }

        self.updated_at = now;
    }

    /// Reset failure state after a successful login
    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }
}
