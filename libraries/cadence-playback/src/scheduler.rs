//! Deferred work for the controller
//!
//! The controller never sleeps. It hands timers to a [`Scheduler`] and the
//! host calls [`PlaybackController::on_timer`](crate::PlaybackController::on_timer)
//! once the delay has elapsed.

use crate::source::LoadStamp;
use std::time::Duration;

/// Work the controller asked to run later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Re-issue a rejected `play()`
    ///
    /// `stamp` identifies the load and `request` the play request the retry
    /// belongs to; the controller ignores retries for anything superseded.
    RetryPlay { stamp: LoadStamp, request: u64 },
}

/// Platform-specific timer facility
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer);
}

/// Virtual-clock scheduler
///
/// Timers fire only when [`advance`](Self::advance) moves the clock past
/// their deadline. Used by tests and the simulator.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_seq: u64,
    pending: Vec<(Duration, u64, Timer)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Timers scheduled but not yet due
    pub fn pending(&self) -> impl Iterator<Item = &Timer> {
        self.pending.iter().map(|(_, _, timer)| timer)
    }

    /// Move the clock forward and return every timer that became due,
    /// in deadline order (ties in scheduling order)
    pub fn advance(&mut self, by: Duration) -> Vec<Timer> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<_> = Vec::new();
        self.pending.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });

        due.sort_by_key(|(deadline, seq, _)| (*deadline, *seq));
        due.into_iter().map(|(_, _, timer)| timer).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, timer: Timer) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push((self.now + delay, seq, timer));
    }
}
