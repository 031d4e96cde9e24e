//! Domain Value Objects
//!
//! Immutable value types for the session/CAPTCHA domain.

/// Outcome of a CAPTCHA validation attempt.
///
/// Validation failures are boolean results, not exceptions: the caller
/// turns `Failed` into `{success: false}` and nothing else. Only
/// infrastructure problems surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Challenge solved; it has already been consumed.
    Passed,
    /// Validation failed; the reason stays server-side.
    Failed(VerifyFailure),
}

impl VerifyOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, VerifyOutcome::Passed)
    }
}

/// Why a validation attempt failed. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    /// No session, invalid token, or session expired
    NoSession,
    /// Session has no pending challenge
    NoChallenge,
    /// Challenge TTL exceeded
    Expired,
    /// Failed attempts exhausted the challenge
    AttemptsExhausted,
    /// X-CSRF-Token did not match the session's token
    CsrfMismatch,
    /// Answer did not match
    WrongAnswer,
    /// Challenge was consumed or replaced by a concurrent request
    AlreadyConsumed,
}

impl VerifyFailure {
    pub const fn as_str(&self) -> &'static str {
        match self {
            VerifyFailure::NoSession => "no_session",
            VerifyFailure::NoChallenge => "no_challenge",
            VerifyFailure::Expired => "expired",
            VerifyFailure::AttemptsExhausted => "attempts_exhausted",
            VerifyFailure::CsrfMismatch => "csrf_mismatch",
            VerifyFailure::WrongAnswer => "wrong_answer",
            VerifyFailure::AlreadyConsumed => "already_consumed",
        }
    }
}

/// Length bounds for generated CAPTCHA answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerLength(usize);

impl AnswerLength {
    pub const MIN: usize = 4;
    pub const MAX: usize = 8;
    pub const DEFAULT: AnswerLength = AnswerLength(5);

    pub fn new(len: usize) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&len) {
            Some(Self(len))
        } else {
            None
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for AnswerLength {
    fn default() -> Self {
        Self::DEFAULT
    }
}
