//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for GET /api/captcha
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaResponse {
    pub id: Uuid,
    /// data:image/png;base64,... (never the plaintext answer)
    pub image: String,
    pub csrf_token: String,
    pub expires_at_ms: i64,
}

/// Request for POST /api/verify-captcha
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCaptchaRequest {
    pub captcha_input: String,
}

/// Response for POST /api/verify-captcha
#[derive(Debug, Clone, Serialize)]
pub struct VerifyCaptchaResponse {
    pub success: bool,
}
