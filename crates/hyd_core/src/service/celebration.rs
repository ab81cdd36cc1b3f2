//! Timed "rank up" celebration flag.
//!
//! The flag is modeled as a deadline rather than a sleeping timer: every
//! trigger replaces the pending clear, so a later trigger can never be cut
//! short by an earlier one.

use chrono::{DateTime, Duration, Local};

pub const CELEBRATION_SECONDS: i64 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CelebrationFlag {
    visible_until: Option<DateTime<Local>>,
}

impl CelebrationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the flag for `CELEBRATION_SECONDS` from `now`.
    pub fn trigger_at(&mut self, now: DateTime<Local>) {
        self.visible_until = Some(now + Duration::seconds(CELEBRATION_SECONDS));
    }

    pub fn is_active_at(&self, now: DateTime<Local>) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Local::now())
    }

    /// When the flag clears, if it is pending.
    pub fn visible_until(&self) -> Option<DateTime<Local>> {
        self.visible_until
    }
}
