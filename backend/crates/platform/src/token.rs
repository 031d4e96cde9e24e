//! Signed Session Tokens
//!
//! The `sid` cookie carries `<session-uuid>.<base64url(hmac-sha256)>`.
//! Both the session gate and the auth layer parse the same cookie through
//! this module, so token state is always scoped to a session handle and
//! never held in process-wide variables.

use uuid::Uuid;

use crate::crypto::{constant_time_eq, from_base64_url, hmac_sha256, to_base64_url};

/// Create a signed token for a session ID.
pub fn create_session_token(session_id: Uuid, secret: &[u8; 32]) -> String {
    let id_str = session_id.to_string();
    let signature = hmac_sha256(secret, id_str.as_bytes());
    format!("{}.{}", id_str, to_base64_url(&signature))
}

/// Verify a signed token and extract the session ID.
///
/// Returns `None` on any structural or signature failure; callers treat
/// that as "no session" and fall back to establishing a fresh one.
pub fn verify_session_token(token: &str, secret: &[u8; 32]) -> Option<Uuid> {
    let (id_str, signature_b64) = token.split_once('.')?;

    let provided = from_base64_url(signature_b64).ok()?;
    let expected = hmac_sha256(secret, id_str.as_bytes());

    if !constant_time_eq(&provided, &expected) {
        return None;
    }

    id_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_token_round_trip() {
        let session_id = Uuid::new_v4();
        let token = create_session_token(session_id, &SECRET);
        assert_eq!(verify_session_token(&token, &SECRET), Some(session_id));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let session_id = Uuid::new_v4();
        let token = create_session_token(session_id, &SECRET);

        // Swap the session id while keeping the signature
        let other_id = Uuid::new_v4();
        let signature = token.split_once('.').unwrap().1;
        let forged = format!("{}.{}", other_id, signature);
        assert_eq!(verify_session_token(&forged, &SECRET), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let session_id = Uuid::new_v4();
        let token = create_session_token(session_id, &SECRET);
        let other_secret = [9u8; 32];
        assert_eq!(verify_session_token(&token, &other_secret), None);
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        assert_eq!(verify_session_token("", &SECRET), None);
        assert_eq!(verify_session_token("no-dot-here", &SECRET), None);
        assert_eq!(verify_session_token("a.b.c", &SECRET), None);
        assert_eq!(verify_session_token("not-a-uuid.!!!", &SECRET), None);
    }
}
