// src/session/mod.rs

pub mod controller;
pub mod ledger;
pub mod monitor;
pub mod timer;

use crate::models::submission::GradedResult;

/// Lifecycle of one assessment session.
///
/// The controller is the sole writer; everything else only observes.
/// `Submitting` is entered at most once per latch acquisition, and
/// `Completed` accepts no further transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Initializing,
    Active { remaining_seconds: u32 },
    Submitting,
    Completed { result: GradedResult },
    /// `retryable` errors accept exactly one further transition, back into
    /// `Submitting` via a manual retry.
    Error { reason: String, retryable: bool },
    Invalid,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Initializing
    }
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }
}

/// Which of the two racing triggers won the transition into `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Timer,
    User,
}

/// Integrity signal kinds observed by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Page hidden / tab switched away.
    VisibilityLost,
    /// Copy, cut, paste, or context-menu invoked.
    ClipboardOrContext,
}

/// Commands an embedder feeds into the session run loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Answer { question_id: i64, option: String },
    Signal(SignalKind),
    Finish,
    RetrySubmit,
    Abandon,
}
