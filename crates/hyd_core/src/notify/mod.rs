//! Local notification planning and delivery.
//!
//! # Responsibility
//! - Model notification requests handed to the platform service.
//! - Define the `NotificationCenter` seam the host implements.
//! - Plan and deliver the fixed before-due reminder offsets.
//!
//! # Invariants
//! - Request identifiers are `"{reminder_id}-{offset}"`, so re-scheduling
//!   the same reminder overwrites instead of duplicating.
//! - Delivery is fire-and-forget: failures are logged and never retried.

mod center;
mod scheduler;

pub use center::InMemoryNotificationCenter;
pub use scheduler::{plan_notifications, ReminderScheduler, ScheduleReport, REMINDER_OFFSETS_DAYS};

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Calendar-based trigger (wall-clock components, not a relative delay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTrigger {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
}

impl CalendarTrigger {
    /// One-shot trigger matching `at` to the minute.
    pub fn once_at(at: DateTime<Local>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
            day: at.day(),
            hour: at.hour(),
            minute: at.minute(),
            repeats: false,
        }
    }
}

/// One scheduling request for the platform notification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Local>,
    pub trigger: CalendarTrigger,
}

/// Platform rejection of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    PermissionDenied,
    Rejected { identifier: String, reason: String },
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Rejected { identifier, reason } => {
                write!(f, "notification `{identifier}` rejected: {reason}")
            }
        }
    }
}

impl Error for NotificationError {}

/// Platform notification service.
pub trait NotificationCenter {
    /// Adds or replaces the pending request with the same identifier.
    fn add(&self, request: NotificationRequest) -> Result<(), NotificationError>;
    /// Drops pending requests; unknown identifiers are ignored.
    fn remove_pending(&self, identifiers: &[String]);
}

impl<T: NotificationCenter + ?Sized> NotificationCenter for &T {
    fn add(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        (**self).add(request)
    }

    fn remove_pending(&self, identifiers: &[String]) {
        (**self).remove_pending(identifiers)
    }
}
