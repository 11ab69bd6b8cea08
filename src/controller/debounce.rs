//! Trailing debouncer with a single pending slot.

use std::time::{Duration, Instant};

/// Holds the latest queued value until `delay` has passed without a newer
/// one. Each `queue` restarts the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn queue(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// The pending value, once its quiet period is over.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        let queued_at = self.pending.as_ref()?.1;
        if now.saturating_duration_since(queued_at) >= self.delay {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
