// src/error.rs

use std::fmt;

/// Session-level error enum.
///
/// All failures surface at the session-controller boundary; the timer,
/// monitor, and ledger have no fallible operations.
#[derive(Debug)]
pub enum SessionError {
    /// Missing session id or empty question set at initialization.
    /// The caller should redirect away; there is nothing to retry.
    InvalidSession(String),

    /// Test-generation collaborator failure.
    Provider(String),

    /// Network or server failure while submitting. The session stays in a
    /// retryable error state; nothing is retried silently.
    Submission(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidSession(msg) => write!(f, "invalid session: {msg}"),
            SessionError::Provider(msg) => write!(f, "test generation failed: {msg}"),
            SessionError::Submission(msg) => write!(f, "submission failed: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Converts plan-validation failures into `InvalidSession`.
/// Allows using the `?` operator when admitting a test plan.
impl From<validator::ValidationErrors> for SessionError {
    fn from(err: validator::ValidationErrors) -> Self {
        SessionError::InvalidSession(err.to_string())
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::Submission(err.to_string())
    }
}
