use std::time::Instant;

/// One play-through, from start command to stop command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub is_playing: bool,
    pub started_at: Instant,
}

impl Session {
    pub fn begin(now: Instant) -> Self {
        Self {
            is_playing: true,
            started_at: now,
        }
    }
}
