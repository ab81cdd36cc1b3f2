//! Reminder domain model.
//!
//! # Responsibility
//! - Define the canonical reminder record and its closed category set.
//! - Own the completion invariant shared by storage and services.
//!
//! # Invariants
//! - `id` is stable and never reused for another reminder.
//! - `completed_at` is set if and only if `is_completed` is true.
//! - `title` is never blank.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every reminder record.
pub type ReminderId = Uuid;

/// Closed category set used for scoring and notification titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Event,
    Appointment,
    Homework,
    Reminder,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::Event,
        TaskType::Appointment,
        TaskType::Homework,
        TaskType::Reminder,
    ];

    /// Points awarded for completing a reminder of this category.
    pub fn base_points(self) -> u32 {
        match self {
            Self::Appointment => 5,
            Self::Event => 10,
            Self::Homework => 15,
            Self::Reminder => 5,
        }
    }

    /// Storage tag, stable across releases.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Appointment => "appointment",
            Self::Homework => "homework",
            Self::Reminder => "reminder",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "event" => Some(Self::Event),
            "appointment" => Some(Self::Appointment),
            "homework" => Some(Self::Homework),
            "reminder" => Some(Self::Reminder),
            _ => None,
        }
    }

    /// User-facing label, also used as notification title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Event => "Evento",
            Self::Appointment => "Cita",
            Self::Homework => "Deber",
            Self::Reminder => "Recordatorio",
        }
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Validation failures for reminder records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    EmptyTitle,
    CompletedWithoutTimestamp,
    TimestampWithoutCompletion,
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::CompletedWithoutTimestamp => {
                write!(f, "completed reminder requires completed_at")
            }
            Self::TimestampWithoutCompletion => {
                write!(f, "completed_at is only valid for completed reminders")
            }
        }
    }
}

impl Error for ReminderValidationError {}

/// Canonical reminder record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderItem {
    pub id: ReminderId,
    /// Free text exactly as entered or proposed.
    pub title: String,
    pub due_at: DateTime<Local>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub is_completed: bool,
    /// Only present once `is_completed` is true.
    pub completed_at: Option<DateTime<Local>>,
}

impl ReminderItem {
    /// Creates an open reminder with a fresh stable ID.
    pub fn new(title: impl Into<String>, due_at: DateTime<Local>, task_type: TaskType) -> Self {
        Self::with_id(Uuid::new_v4(), title, due_at, task_type)
    }

    /// Creates an open reminder with a caller-provided ID.
    pub fn with_id(
        id: ReminderId,
        title: impl Into<String>,
        due_at: DateTime<Local>,
        task_type: TaskType,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            due_at,
            task_type,
            is_completed: false,
            completed_at: None,
        }
    }

    /// Marks this reminder completed.
    ///
    /// Returns `false` and leaves the record untouched when it was already
    /// completed.
    pub fn complete(&mut self, at: DateTime<Local>) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.completed_at = Some(at);
        true
    }

    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.title.trim().is_empty() {
            return Err(ReminderValidationError::EmptyTitle);
        }
        match (self.is_completed, self.completed_at.is_some()) {
            (true, false) => Err(ReminderValidationError::CompletedWithoutTimestamp),
            (false, true) => Err(ReminderValidationError::TimestampWithoutCompletion),
            _ => Ok(()),
        }
    }
}
