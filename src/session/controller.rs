// src/session/controller.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time;
use validator::Validate;

use crate::{
    error::SessionError,
    gateway::SubmissionGateway,
    models::{
        question::Question,
        submission::{GradedResult, SubmissionPayload, TestPlan, TrustMetrics},
    },
    session::{
        SessionCommand, SessionState, SignalKind, SubmitTrigger,
        ledger::AnswerLedger,
        monitor::{IntegrityMonitor, SignalDisposition},
        timer::{CountdownTimer, TimerEvent, TimerHandle},
    },
    state::SessionContext,
};

/// Owns one running assessment session end to end.
///
/// The controller is the sole writer of the session state, the trust
/// counters, and the answer ledger; the timer and monitor only emit
/// notifications. A single-use latch guarantees at most one entry into
/// `Submitting` no matter how timer expiry and a user finish interleave.
pub struct SessionController<G: SubmissionGateway> {
    ctx: SessionContext,
    session_id: i64,
    questions: Vec<Question>,
    state: SessionState,
    ledger: AnswerLedger,
    monitor: IntegrityMonitor,
    /// Taken by `run`; direct-drive embedders schedule their own ticks.
    timer: Option<CountdownTimer>,
    timer_handle: TimerHandle,
    gateway: Arc<G>,
    /// Frozen at the first entry into `Submitting`. Retries reuse it, so
    /// nothing observed during the network round-trip can reach the wire.
    payload: Option<SubmissionPayload>,
    /// The single-transition latch.
    submitting: bool,
    started_at: DateTime<Utc>,
}

impl<G: SubmissionGateway> SessionController<G> {
    /// Initializing -> Active.
    ///
    /// Rejects a plan with no session id or an empty question set; the
    /// caller should redirect away on error, since no session can run
    /// without both.
    pub fn begin(
        ctx: SessionContext,
        plan: TestPlan,
        gateway: Arc<G>,
    ) -> Result<Self, SessionError> {
        plan.validate()?;

        let (timer, timer_handle) = CountdownTimer::new(plan.duration_seconds);
        let monitor = IntegrityMonitor::new(ctx.notifier.clone());

        tracing::info!(
            session_id = plan.session_id,
            questions = plan.questions.len(),
            duration_seconds = plan.duration_seconds,
            "session active"
        );

        Ok(Self {
            ctx,
            session_id: plan.session_id,
            questions: plan.questions,
            state: SessionState::Active {
                remaining_seconds: plan.duration_seconds,
            },
            ledger: AnswerLedger::new(),
            monitor,
            timer: Some(timer),
            timer_handle,
            gateway,
            payload: None,
            submitting: false,
            started_at: Utc::now(),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn trust_metrics(&self) -> TrustMetrics {
        self.monitor.snapshot()
    }

    pub fn completion_count(&self) -> usize {
        self.ledger.completion_count()
    }

    /// Records the candidate's selection. Observable only while Active.
    pub fn record_answer(&mut self, question_id: i64, option: impl Into<String>) {
        if !self.state.is_active() {
            return;
        }
        self.ledger.record(question_id, option);
    }

    /// Forwards an integrity signal to the monitor. Inert outside Active,
    /// since the monitor is disarmed on every exit from that state.
    pub fn observe_signal(&mut self, kind: SignalKind) -> SignalDisposition {
        self.monitor.observe(kind)
    }

    /// One countdown notification. `remaining_seconds` never increases.
    pub fn on_tick(&mut self, remaining: u32) {
        if let SessionState::Active { remaining_seconds } = &mut self.state {
            if remaining < *remaining_seconds {
                *remaining_seconds = remaining;
            }
        }
    }

    /// Timer expiry: auto-submit. Never asks for confirmation, whatever
    /// the completion count.
    pub async fn on_timer_expired(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.submit(SubmitTrigger::Timer).await;
    }

    /// User-initiated finish.
    ///
    /// With unanswered questions remaining, asks the confirmation
    /// collaborator first; declining keeps the session Active and is not
    /// an error. Silently ignored once `Submitting` has been entered.
    pub async fn finish(&mut self) {
        if !self.state.is_active() || self.submitting {
            return;
        }

        let total = self.questions.len();
        let answered = self.ledger.completion_count();
        if answered < total {
            let unanswered = total - answered;
            if !self.ctx.confirm.confirm_submit(unanswered, total).await {
                tracing::debug!(unanswered, total, "submission declined, session stays active");
                return;
            }
            // Latch re-check: the confirmation was an await point and the
            // timer may have won the race behind it.
            if !self.state.is_active() || self.submitting {
                return;
            }
        }

        self.submit(SubmitTrigger::User).await;
    }

    /// Manual retry after a retryable submission failure. Re-enters
    /// `Submitting` with the payload frozen by the first attempt.
    pub async fn retry_submit(&mut self) {
        if !matches!(
            self.state,
            SessionState::Error {
                retryable: true,
                ..
            }
        ) {
            return;
        }
        self.submit(SubmitTrigger::User).await;
    }

    /// Navigation away from the session: synchronous teardown. Idempotent.
    pub fn abandon(&mut self) {
        self.timer_handle.cancel();
        self.monitor.disarm();
        if self.state.is_active() {
            tracing::info!(session_id = self.session_id, "session abandoned");
            self.state = SessionState::Invalid;
        }
    }

    /// The single transition into `Submitting`. The first of {timer
    /// expiry, user finish} wins; every later trigger is a no-op. Tears
    /// the timer and monitor down, freezes the payload, then performs the
    /// only suspending call of the session.
    async fn submit(&mut self, trigger: SubmitTrigger) {
        if self.submitting {
            return;
        }
        self.submitting = true;

        self.timer_handle.cancel();
        self.monitor.disarm();

        let payload = match self.payload.clone() {
            Some(frozen) => frozen,
            None => {
                let frozen = SubmissionPayload {
                    session_id: self.session_id,
                    answers: self.ledger.snapshot(),
                    trust_metrics: self.monitor.snapshot(),
                };
                self.payload = Some(frozen.clone());
                frozen
            }
        };

        self.state = SessionState::Submitting;
        tracing::info!(session_id = self.session_id, ?trigger, "submitting assessment");

        match self.exchange(&payload, trigger).await {
            Ok(result) => {
                let elapsed = Utc::now().signed_duration_since(self.started_at);
                tracing::info!(
                    session_id = self.session_id,
                    score = result.score,
                    trust_score = result.trust_score,
                    elapsed_seconds = elapsed.num_seconds(),
                    "session completed"
                );
                self.state = SessionState::Completed { result };
            }
            Err(e) => {
                tracing::error!(session_id = self.session_id, error = %e, "submission failed");
                // Release the latch so a manual retry can re-enter
                // Submitting with the same payload.
                self.submitting = false;
                self.state = SessionState::Error {
                    reason: e.to_string(),
                    retryable: true,
                };
            }
        }
    }

    /// One gateway exchange, with bounded automatic retry for the
    /// timer-expiry trigger: the candidate may no longer be present to
    /// click anything, so the attempt must not be dropped on first failure.
    async fn exchange(
        &self,
        payload: &SubmissionPayload,
        trigger: SubmitTrigger,
    ) -> Result<GradedResult, SessionError> {
        let retries = match trigger {
            SubmitTrigger::Timer => self.ctx.config.submit_retry_limit,
            SubmitTrigger::User => 0,
        };

        let mut attempt = 0u32;
        loop {
            match self.gateway.submit(payload).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    let backoff = Duration::from_millis(
                        self.ctx.config.submit_retry_backoff_ms * u64::from(attempt),
                    );
                    tracing::warn!(
                        session_id = payload.session_id,
                        attempt,
                        error = %e,
                        "auto-submit failed, retrying in {:?}",
                        backoff
                    );
                    time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Cooperative event loop: merges the countdown sequence with embedder
    /// commands. Ordering between a tick and a command is not guaranteed;
    /// the latch resolves the race either way.
    ///
    /// Returns the final state. `Completed` carries the graded result for
    /// the results collaborator, unchanged. Dropping every command sender
    /// abandons the session, so teardown is one owned call.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> SessionState {
        let mut timer = match self.timer.take() {
            Some(timer) => timer,
            None => {
                // A controller is only ever run once.
                self.abandon();
                return self.state;
            }
        };
        let mut timer_live = true;

        loop {
            tokio::select! {
                event = timer.next(), if timer_live => match event {
                    Some(TimerEvent::Tick { remaining_seconds }) => {
                        self.on_tick(remaining_seconds);
                    }
                    Some(TimerEvent::Expired) => {
                        timer_live = false;
                        self.on_timer_expired().await;
                    }
                    None => timer_live = false,
                },
                command = commands.recv() => match command {
                    Some(SessionCommand::Answer { question_id, option }) => {
                        self.record_answer(question_id, option);
                    }
                    Some(SessionCommand::Signal(kind)) => {
                        self.observe_signal(kind);
                    }
                    Some(SessionCommand::Finish) => self.finish().await,
                    Some(SessionCommand::RetrySubmit) => self.retry_submit().await,
                    Some(SessionCommand::Abandon) | None => {
                        self.abandon();
                        break;
                    }
                },
            }

            match self.state {
                SessionState::Completed { .. } | SessionState::Invalid => break,
                SessionState::Error { retryable: false, .. } => break,
                // A retryable error keeps the loop alive for RetrySubmit.
                _ => {}
            }
        }

        self.state
    }
}
