// src/session/monitor.rs

use std::sync::Arc;

use crate::config::VISIBILITY_WARNING_LIMIT;
use crate::models::submission::TrustMetrics;
use crate::notify::Notify;
use crate::session::SignalKind;

/// What the embedder should do with the raw event behind a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalDisposition {
    /// Suppress the event's default effect. Always true for clipboard and
    /// context-menu events while the monitor is armed: they are prevented
    /// entirely, not merely logged.
    pub suppress_default: bool,
    /// Whether the observation landed in the counters.
    pub counted: bool,
}

impl SignalDisposition {
    fn inert() -> Self {
        Self {
            suppress_default: false,
            counted: false,
        }
    }
}

/// Counts integrity-violating behavior while armed.
///
/// Armed on construction (session entry to Active) and disarmed on any
/// exit from Active. A disarmed monitor is fully inert: late events touch
/// neither the counters nor the candidate. Leaving a monitor armed across
/// sessions corrupts the next session's counters, so teardown is part of
/// the controller's transition contract, not a cleanup nicety.
pub struct IntegrityMonitor {
    metrics: TrustMetrics,
    armed: bool,
    notifier: Arc<dyn Notify>,
}

impl IntegrityMonitor {
    pub fn new(notifier: Arc<dyn Notify>) -> Self {
        Self {
            metrics: TrustMetrics::default(),
            armed: true,
            notifier,
        }
    }

    /// Registers one observed signal and says what to do with the raw
    /// event. Each armed observation bumps the matching counter by one.
    /// Visibility losses warn on occurrences 1 through
    /// `VISIBILITY_WARNING_LIMIT` only; clipboard events warn every time.
    pub fn observe(&mut self, kind: SignalKind) -> SignalDisposition {
        if !self.armed {
            return SignalDisposition::inert();
        }

        match kind {
            SignalKind::VisibilityLost => {
                self.metrics.tab_switches += 1;
                if self.metrics.tab_switches <= VISIBILITY_WARNING_LIMIT {
                    self.notifier
                        .warn("Warning: switching tabs affects your trust score!");
                }
                SignalDisposition {
                    suppress_default: false,
                    counted: true,
                }
            }
            SignalKind::ClipboardOrContext => {
                self.metrics.copy_attempts += 1;
                self.notifier
                    .warn("Copying and pasting are disabled during the test!");
                SignalDisposition {
                    suppress_default: true,
                    counted: true,
                }
            }
        }
    }

    /// Deregisters the monitor. Idempotent.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Immutable copy of the counters, for the frozen submission payload.
    pub fn snapshot(&self) -> TrustMetrics {
        self.metrics
    }
}
