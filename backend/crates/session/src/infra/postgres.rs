//! PostgreSQL Repository Implementations

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{CaptchaChallenge, Session};
use crate::domain::repository::{ChallengeRateLimitRepository, SessionRepository};
use crate::error::{SessionError, SessionResult};
use kernel::role::UserRole;
use platform::client::ClientFingerprint;

const RATE_LIMIT_RETENTION_MS: i64 = 3600_000; // 1 hour

/// PostgreSQL-backed session repository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions and stale rate-limit windows
    pub async fn cleanup_expired_data(&self) -> SessionResult<(u64, u64)> {
        let now_ms = Utc::now().timestamp_millis();

        let sessions_deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let rate_limits_deleted =
            sqlx::query("DELETE FROM captcha_rate_limits WHERE window_start_ms < $1")
                .bind(now_ms - RATE_LIMIT_RETENTION_MS)
                .execute(&self.pool)
                .await?
                .rows_affected();

        tracing::info!(
            sessions = sessions_deleted,
            rate_limits = rate_limits_deleted,
            "Cleaned up expired session data"
        );

        Ok((sessions_deleted, rate_limits_deleted))
    }
}

impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> SessionResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                user_id,
                user_role,
                csrf_token,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at,
                expires_at_ms
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id)
        .bind(session.user_role.map(|r| r.id()))
        .bind(&session.csrf_token)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .bind(session.expires_at_ms)
        .execute(&self.pool)
        .await?;

        tracing::info!(session_id = %session.session_id, "Session created");

        Ok(())
    }

    async fn get(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> SessionResult<Option<Session>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                user_role,
                captcha_id,
                captcha_answer,
                captcha_issued_at,
                captcha_expires_at_ms,
                captcha_attempts_left,
                captcha_passed_at_ms,
                csrf_token,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at,
                expires_at_ms
            FROM sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => {
                if r.client_fingerprint_hash != fingerprint_hash {
                    tracing::warn!(session_id = %session_id, "Session fingerprint mismatch");
                    return Err(SessionError::SessionFingerprintMismatch);
                }
                Ok(Some(r.into_session()))
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
        let updated = sqlx::query(
            r#"
            UPDATE sessions SET
                captcha_id = $2,
                captcha_answer = $3,
                captcha_issued_at = $4,
                captcha_expires_at_ms = $5,
                captcha_attempts_left = $6,
                csrf_token = $7,
                last_activity_at = now()
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(challenge.id)
        .bind(&challenge.answer)
        .bind(challenge.issued_at)
        .bind(challenge.expires_at_ms)
        .bind(challenge.attempts_left)
        .bind(csrf_token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(SessionError::SessionInvalid);
        }

        tracing::info!(
            session_id = %session_id,
            challenge_id = %challenge.id,
            "Challenge stored on session"
        );

        Ok(())
    }

    async fn consume_challenge(
        &self,
        session_id: Uuid,
        challenge_id: Uuid,
        passed_at_ms: i64,
    ) -> SessionResult<bool> {
        // Guarding on captcha_id makes consumption single-use even under
        // concurrent validation or a racing re-issue.
        let updated = sqlx::query(
            r#"
            UPDATE sessions SET
                captcha_id = NULL,
                captcha_answer = NULL,
                captcha_issued_at = NULL,
                captcha_expires_at_ms = NULL,
                captcha_attempts_left = NULL,
                captcha_passed_at_ms = $3,
                last_activity_at = now()
            WHERE session_id = $1 AND captcha_id = $2
            "#,
        )
        .bind(session_id)
        .bind(challenge_id)
        .bind(passed_at_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn record_failed_attempt(
        &self,
        session_id: Uuid,
        challenge_id: Uuid,
    ) -> SessionResult<i16> {
        let remaining = sqlx::query_scalar::<_, i16>(
            r#"
            UPDATE sessions SET
                captcha_attempts_left = captcha_attempts_left - 1,
                last_activity_at = now()
            WHERE session_id = $1 AND captcha_id = $2 AND captcha_attempts_left > 0
            RETURNING captcha_attempts_left
            "#,
        )
        .bind(session_id)
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await?
        .unwrap_or(0);

        if remaining == 0 {
            // Exhausted challenges are cleared; the client must request
            // a fresh one.
            sqlx::query(
                r#"
                UPDATE sessions SET
                    captcha_id = NULL,
                    captcha_answer = NULL,
                    captcha_issued_at = NULL,
                    captcha_expires_at_ms = NULL,
                    captcha_attempts_left = NULL
                WHERE session_id = $1 AND captcha_id = $2
                "#,
            )
            .bind(session_id)
            .bind(challenge_id)
            .execute(&self.pool)
            .await?;

            tracing::warn!(session_id = %session_id, "CAPTCHA attempts exhausted");
        }

        Ok(remaining)
    }

    async fn consume_captcha_pass(
        &self,
        session_id: Uuid,
        not_before_ms: i64,
    ) -> SessionResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE sessions SET
                captcha_passed_at_ms = NULL,
                last_activity_at = now()
            WHERE session_id = $1
              AND captcha_passed_at_ms IS NOT NULL
              AND captcha_passed_at_ms >= $2
            "#,
        )
        .bind(session_id)
        .bind(not_before_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn bind_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> SessionResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE sessions SET
                user_id = $2,
                user_role = $3,
                last_activity_at = now()
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(role.id())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(SessionError::SessionInvalid);
        }

        tracing::info!(session_id = %session_id, user_id = %user_id, "User bound to session");

        Ok(())
    }

    async fn touch(&self, session_id: Uuid) -> SessionResult<()> {
        sqlx::query("UPDATE sessions SET last_activity_at = now() WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> SessionResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

impl ChallengeRateLimitRepository for PgSessionRepository {
    async fn check(
        &self,
        fingerprint: &ClientFingerprint,
        max_requests: u32,
        window_ms: i64,
    ) -> SessionResult<bool> {
        let now_ms = Utc::now().timestamp_millis();
        let window_start = (now_ms / window_ms) * window_ms;

        let row = sqlx::query_as::<_, (i32,)>(
            r#"
            INSERT INTO captcha_rate_limits (client_fingerprint_hash, window_start_ms, request_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (client_fingerprint_hash, window_start_ms)
            DO UPDATE SET request_count = captcha_rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(fingerprint.hash.as_slice())
        .bind(window_start)
        .fetch_one(&self.pool)
        .await?;

        let count = row.0 as u32;
        let allowed = count <= max_requests;

        if !allowed {
            tracing::warn!(count = count, max = max_requests, "Rate limit exceeded");
        }

        Ok(allowed)
    }
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Option<Uuid>,
    user_role: Option<i16>,
    captcha_id: Option<Uuid>,
    captcha_answer: Option<String>,
    captcha_issued_at: Option<chrono::DateTime<chrono::Utc>>,
    captcha_expires_at_ms: Option<i64>,
    captcha_attempts_left: Option<i16>,
    captcha_passed_at_ms: Option<i64>,
    csrf_token: String,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    last_activity_at: chrono::DateTime<chrono::Utc>,
    expires_at_ms: i64,
}

impl SessionRow {
    fn into_session(self) -> Session {
        let challenge = match (
            self.captcha_id,
            self.captcha_answer,
            self.captcha_issued_at,
            self.captcha_expires_at_ms,
        ) {
            (Some(id), Some(answer), Some(issued_at), Some(expires_at_ms)) => {
                Some(CaptchaChallenge {
                    id,
                    answer,
                    issued_at,
                    expires_at_ms,
                    attempts_left: self.captcha_attempts_left.unwrap_or(0),
                })
            }
            _ => None,
        };

        Session {
            session_id: self.session_id,
            user_id: self.user_id,
            user_role: self.user_role.and_then(UserRole::from_id),
            challenge,
            captcha_passed_at_ms: self.captcha_passed_at_ms,
            csrf_token: self.csrf_token,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            expires_at_ms: self.expires_at_ms,
        }
    }
}
