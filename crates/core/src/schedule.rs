//! Cancellable repeating tasks for the single control thread.
//!
//! Nothing here owns a thread or a timer. The host loop polls the tasks;
//! cancelling is a plain state change, so it has taken effect by the time
//! `cancel` returns.

use std::time::{Duration, Instant};

/// A callback slot serviced once per rendered display frame until cancelled.
#[derive(Debug, Default, Clone)]
pub struct FrameTask {
    armed: bool,
}

impl FrameTask {
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    /// Called once per frame. Returns true while the task is armed; it stays
    /// armed for the next frame.
    pub fn fire(&mut self) -> bool {
        self.armed
    }
}

/// A task due every `period` of wall-clock time.
#[derive(Debug, Clone)]
pub struct IntervalTask {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTask {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// First run is one period after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Returns true at most once per call when the task is due. Missed
    /// periods are skipped rather than replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let mut next = due + self.period;
        while next <= now {
            next += self.period;
        }
        self.next_due = Some(next);
        true
    }
}
