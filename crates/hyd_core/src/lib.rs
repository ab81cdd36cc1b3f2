//! Core domain logic for HYD.
//! This crate is the single source of truth for task, reminder and profile
//! invariants; the presentation shell only renders what it exposes.

pub mod app;
pub mod calendar;
pub mod classifier;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use app::{launch, AppConfig, AppError, HydApp, Launch};
pub use classifier::date_detector::{DateDetector, DateLocale, DetectedDate, PatternDateDetector};
pub use classifier::{infer_task_type, Proposal, TextClassifier};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::mood::Mood;
pub use model::profile::UserProfile;
pub use model::rank::UserRank;
pub use model::reminder::{ReminderId, ReminderItem, ReminderValidationError, TaskType};
pub use notify::{
    CalendarTrigger, InMemoryNotificationCenter, NotificationCenter, NotificationError,
    NotificationRequest, ReminderScheduler, ScheduleReport,
};
pub use repo::profile_repo::{ProfileStore, ProfileValue, SqliteProfileStore};
pub use repo::reminder_repo::{
    ReminderListQuery, ReminderRepository, RepoError, RepoResult, SqliteReminderRepository,
};
pub use service::profile_service::{AwardOutcome, ProfileError, ProfileService};
pub use service::reminder_service::{
    CompletionOutcome, ReminderService, ReminderServiceError, ReminderStats,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
