use std::time::{Duration, Instant};

use crate::schedule::IntervalTask;

pub const RESET_DISPLAY: &str = "00:00:00";

/// Format as zero-padded `HH:MM:SS`. Hours are not wrapped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Elapsed-time readout, refreshed once per second while running.
#[derive(Debug)]
pub struct ElapsedTimer {
    started_at: Option<Instant>,
    refresh: IntervalTask,
    display: String,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self {
            started_at: None,
            refresh: IntervalTask::new(Duration::from_secs(1)),
            display: RESET_DISPLAY.to_string(),
        }
    }

    pub fn start(&mut self, started_at: Instant) {
        self.started_at = Some(started_at);
        self.display = format_elapsed(Duration::ZERO);
        self.refresh.schedule(started_at);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
        self.refresh.cancel();
        self.display = RESET_DISPLAY.to_string();
    }

    /// Refresh the readout if a second has passed. Returns true when the
    /// displayed text changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        if !self.refresh.poll(now) {
            return false;
        }

        let display = format_elapsed(now.saturating_duration_since(started_at));
        if display == self.display {
            return false;
        }
        self.display = display;
        true
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

impl Default for ElapsedTimer {
    fn default() -> Self {
        Self::new()
    }
}
