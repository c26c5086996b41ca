// src/notify.rs

use async_trait::async_trait;

/// Non-blocking user notifications (the toast equivalent).
///
/// Warnings must never block the session: implementations fire and return.
pub trait Notify: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default notifier: routes warnings into the tracing pipeline.
#[derive(Debug, Default)]
pub struct TracingNotify;

impl Notify for TracingNotify {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Blocking confirmation for submitting with unanswered questions.
/// The only blocking interaction a session ever requests.
#[async_trait]
pub trait ConfirmSubmit: Send + Sync {
    /// `unanswered` of `total` questions have no recorded answer.
    /// Return false to keep the session active.
    async fn confirm_submit(&self, unanswered: usize, total: usize) -> bool;
}

/// Confirms unconditionally. For embedders that render their own
/// pre-submit summary instead of a dialog.
#[derive(Debug, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmSubmit for AlwaysConfirm {
    async fn confirm_submit(&self, _unanswered: usize, _total: usize) -> bool {
        true
    }
}
