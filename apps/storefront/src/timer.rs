//! # Clock and Timer Queue
//!
//! Page code runs on one logical thread; deferred work (toast dismissal) is
//! queued here and drained by `App::tick`.
//!
//! ```text
//! schedule(due=2000ms, A)   schedule(due=2000ms, B)   schedule(due=500ms, C)
//!
//! take_due(2000ms) ──► [C, A, B]   ordered by due time, then insertion
//! ```

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Handle for cancelling a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Pending payloads keyed by due time.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_seq: u64,
    entries: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        TimerQueue {
            next_seq: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        TimerQueue::default()
    }

    pub fn schedule(&mut self, due: Duration, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((due, seq), payload);
        TimerId(seq)
    }

    /// Drops a pending entry, returning its payload if it had not fired.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.entries.keys().find(|(_, seq)| *seq == id.0).copied()?;
        self.entries.remove(&key)
    }

    /// Removes and returns every entry due at or before `now`.
    pub fn take_due(&mut self, now: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_take_due_orders_by_time_then_insertion() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(2000), "a");
        queue.schedule(ms(2000), "b");
        queue.schedule(ms(500), "c");
        queue.schedule(ms(3000), "d");

        assert_eq!(queue.take_due(ms(499)), Vec::<&str>::new());
        assert_eq!(queue.take_due(ms(2000)), vec!["c", "a", "b"]);
        assert_eq!(queue.next_due(), Some(ms(3000)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule(ms(10), 1);
        queue.schedule(ms(20), 2);

        assert_eq!(queue.cancel(a), Some(1));
        assert_eq!(queue.cancel(a), None);
        assert_eq!(queue.take_due(ms(100)), vec![2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(ms(1500));
        assert_eq!(view.now(), ms(1500));
        view.set(ms(10));
        assert_eq!(clock.now(), ms(10));
    }
}
