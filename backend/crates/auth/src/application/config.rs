//! Application Configuration
//!
//! Configuration for the Auth application layer. Session cookie and TTL
//! settings live in `session::SessionConfig`; this config covers the
//! account-side concerns only.

/// Auth application configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl AuthConfig {
    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
