//! Application Configuration
//!
//! Configuration for the session/CAPTCHA application layer.

use std::time::Duration;

use crate::domain::value_objects::AnswerLength;

/// Re-export cookie types from platform
pub use platform::cookie::{CookieConfig, SameSite};

/// Session & CAPTCHA gate configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cookie name for the session identifier
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Session TTL (24 hours)
    pub session_ttl: Duration,
    /// Generated answer length
    pub captcha_answer_len: AnswerLength,
    /// Challenge TTL
    pub captcha_ttl: Duration,
    /// Failed attempts allowed per challenge
    pub captcha_max_attempts: i16,
    /// Freshness window of the human pass consumed by sensitive actions
    pub captcha_pass_ttl: Duration,
    /// Rate limit: max challenge issuances per window
    pub rate_limit_max_requests: u32,
    /// Rate limit window
    pub rate_limit_window: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "sid".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(24 * 3600),
            captcha_answer_len: AnswerLength::DEFAULT,
            captcha_ttl: Duration::from_secs(180),
            captcha_max_attempts: 3,
            captcha_pass_ttl: Duration::from_secs(600),
            rate_limit_max_requests: 10,
            rate_limit_window: Duration::from_secs(60),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl SessionConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    pub fn captcha_ttl_ms(&self) -> i64 {
        self.captcha_ttl.as_millis() as i64
    }

    pub fn captcha_pass_ttl_ms(&self) -> i64 {
        self.captcha_pass_ttl.as_millis() as i64
    }

    pub fn rate_limit_window_ms(&self) -> i64 {
        self.rate_limit_window.as_millis() as i64
    }

    /// Cookie settings for the `sid` cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs() as i64),
        }
    }
}
