// src/session/timer.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// One notification from the countdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Fires once per second with the seconds left. Strictly decreasing.
    Tick { remaining_seconds: u32 },
    /// The distinguished terminal notification; the sequence ends after it.
    Expired,
}

/// Cancellation handle for a running countdown.
///
/// Cancelling stops all future notifications and is idempotent; cancelling
/// an already exhausted timer is a no-op.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A finite, cancellable, one-per-second countdown.
///
/// Not restartable: construct a new timer per session. Cancellation and
/// exhaustion are terminal states of the sequence itself, not flags the
/// caller has to track.
pub struct CountdownTimer {
    interval: Interval,
    remaining_seconds: u32,
    exhausted: bool,
    cancelled: Arc<AtomicBool>,
}

impl CountdownTimer {
    pub fn new(duration_seconds: u32) -> (Self, TimerHandle) {
        let period = Duration::from_secs(1);
        let mut interval = time::interval_at(Instant::now() + period, period);
        // If the event loop stalls, skip the missed seconds instead of
        // bursting a backlog of ticks.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = TimerHandle {
            cancelled: cancelled.clone(),
        };

        (
            Self {
                interval,
                remaining_seconds: duration_seconds,
                exhausted: duration_seconds == 0,
                cancelled,
            },
            handle,
        )
    }

    /// Next notification, or `None` forever once the sequence is cancelled
    /// or exhausted.
    pub async fn next(&mut self) -> Option<TimerEvent> {
        if self.exhausted || self.cancelled.load(Ordering::Relaxed) {
            return None;
        }

        self.interval.tick().await;

        // A cancel may have landed while we were parked on the interval.
        if self.cancelled.load(Ordering::Relaxed) {
            return None;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.exhausted = true;
            return Some(TimerEvent::Expired);
        }

        Some(TimerEvent::Tick {
            remaining_seconds: self.remaining_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second_and_expires() {
        let (mut timer, _handle) = CountdownTimer::new(3);

        assert_eq!(
            timer.next().await,
            Some(TimerEvent::Tick {
                remaining_seconds: 2
            })
        );
        assert_eq!(
            timer.next().await,
            Some(TimerEvent::Tick {
                remaining_seconds: 1
            })
        );
        assert_eq!(timer.next().await, Some(TimerEvent::Expired));
        assert_eq!(timer.next().await, None);
        assert_eq!(timer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn sequence_is_finite_and_strictly_decreasing() {
        let (mut timer, _handle) = CountdownTimer::new(1800);

        let mut events = 0u32;
        let mut previous = 1800u32;
        loop {
            match timer.next().await {
                Some(TimerEvent::Tick { remaining_seconds }) => {
                    events += 1;
                    assert_eq!(remaining_seconds, previous - 1);
                    previous = remaining_seconds;
                }
                Some(TimerEvent::Expired) => {
                    events += 1;
                    break;
                }
                None => panic!("sequence ended without expiring"),
            }
        }

        assert_eq!(events, 1800);
        assert_eq!(timer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_notifications() {
        let (mut timer, handle) = CountdownTimer::new(10);

        assert!(timer.next().await.is_some());

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        assert_eq!(timer.next().await, None);
        assert_eq!(timer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_tick_yields_nothing() {
        let (mut timer, handle) = CountdownTimer::new(10);

        handle.cancel();
        assert_eq!(timer.next().await, None);
    }
}
