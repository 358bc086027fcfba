//! # Debounce & Throttle
//!
//! Rate-limiting gates for UI handlers (search-as-you-type, scroll loading,
//! repeated "add to cart" taps).
//!
//! Both gates are driven by a caller-supplied `now` (time elapsed on the
//! host's clock), so they hold no timers of their own and stay pure.
//!
//! ```text
//! calls:     x  x x      x                 x x x x x x
//! debounce:           ▲(wait)         ▲        (quiet) ▲   last call wins
//! throttle:  ▲           ▲                 ▲       ▲       first call per window
//! ```

use std::time::Duration;

/// Delivers the most recent call once `wait` has passed without new calls.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    wait: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debounce<T> {
    pub fn new(wait: Duration) -> Self {
        Debounce {
            wait,
            pending: None,
        }
    }

    /// Records a call, replacing any pending one and restarting the wait.
    pub fn call(&mut self, now: Duration, value: T) {
        self.pending = Some((value, now + self.wait));
    }

    /// Takes the pending call if its quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// When the pending call becomes deliverable.
    pub fn due_at(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending call without delivering it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Admits at most one call per `limit` window.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Duration,
    open_at: Option<Duration>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Throttle {
            limit,
            open_at: None,
        }
    }

    /// Returns `true` when the call may run; it then closes the gate for
    /// `limit`.
    pub fn try_call(&mut self, now: Duration) -> bool {
        match self.open_at {
            Some(open_at) if now < open_at => false,
            _ => {
                self.open_at = Some(now + self.limit);
                true
            }
        }
    }

    pub fn is_open(&self, now: Duration) -> bool {
        self.open_at.map_or(true, |open_at| now >= open_at)
    }
}
