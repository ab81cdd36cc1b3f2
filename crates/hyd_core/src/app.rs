//! Application bootstrap and use-case wiring.
//!
//! # Responsibility
//! - Resolve launch configuration (database path, logging).
//! - Open storage, failing hard only on a schema mismatch, and start the
//!   launch-time retention sweep.
//! - Wire classifier, reminder/profile services and the scheduler behind
//!   one single-context facade for the presentation layer.
//!
//! # Invariants
//! - Every store mutation and point award goes through one `HydApp`, which
//!   borrows one connection; callers serialize access by owning it.
//! - Notification scheduling never fails a user-visible operation.

use crate::classifier::date_detector::DateLocale;
use crate::classifier::{Proposal, TextClassifier};
use crate::db::{open_db, DbError};
use crate::logging::{default_log_level, init_logging};
use crate::model::mood::Mood;
use crate::model::profile::UserProfile;
use crate::model::rank::UserRank;
use crate::model::reminder::{ReminderId, ReminderItem, TaskType};
use crate::notify::{NotificationCenter, ReminderScheduler, ScheduleReport};
use crate::repo::profile_repo::SqliteProfileStore;
use crate::repo::reminder_repo::{RepoResult, SqliteReminderRepository};
use crate::service::profile_service::{ProfileError, ProfileService};
use crate::service::reminder_service::{
    CompletionOutcome, ReminderService, ReminderServiceError, ReminderStats,
};
use crate::service::retention::spawn_retention_sweep;
use chrono::{DateTime, Local};
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::thread::JoinHandle;

const DB_FILE_NAME: &str = "hyd.sqlite3";
const DB_PATH_ENV: &str = "HYD_DB_PATH";
const LOG_DIR_ENV: &str = "HYD_LOG_DIR";
const LOG_LEVEL_ENV: &str = "HYD_LOG_LEVEL";
const LOCALE_ENV: &str = "HYD_LOCALE";

/// Launch configuration supplied by the host shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Absolute directory for rolling logs; `None` leaves logging to the host.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub locale: DateLocale,
}

impl AppConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_dir: None,
            log_level: default_log_level().to_string(),
            locale: DateLocale::default(),
        }
    }

    /// Reads `HYD_DB_PATH`, `HYD_LOG_DIR`, `HYD_LOG_LEVEL` and `HYD_LOCALE`.
    ///
    /// Blank or unknown values fall back to defaults: a database in the temp
    /// directory, no log directory, the build-mode log level and Spanish.
    pub fn from_env() -> Self {
        let db_path = env_value(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));

        Self {
            db_path,
            log_dir: env_value(LOG_DIR_ENV).map(PathBuf::from),
            log_level: env_value(LOG_LEVEL_ENV)
                .unwrap_or_else(|| default_log_level().to_string()),
            locale: env_value(LOCALE_ENV)
                .and_then(|value| DateLocale::from_tag(&value))
                .unwrap_or_default(),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Launch/bootstrap failures.
#[derive(Debug)]
pub enum AppError {
    Logging(String),
    Db(DbError),
    Profile(ProfileError),
}

impl AppError {
    /// Stored data cannot be read by this build and must be wiped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_schema_mismatch())
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Profile(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
            Self::Profile(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<ProfileError> for AppError {
    fn from(value: ProfileError) -> Self {
        Self::Profile(value)
    }
}

/// An opened database plus the retention sweep started for it.
#[derive(Debug)]
pub struct Launch {
    pub conn: Connection,
    /// `None` when the sweep worker could not be started.
    pub sweep: Option<JoinHandle<()>>,
}

impl Launch {
    /// Waits for the retention sweep; short-lived hosts call this before
    /// exiting so the sweep is not cut off.
    pub fn wait_for_sweep(&mut self) {
        if let Some(handle) = self.sweep.take() {
            if handle.join().is_err() {
                warn!("event=retention_sweep module=app status=error stage=join");
            }
        }
    }
}

/// Opens the database for a launch and kicks off the retention sweep.
///
/// # Errors
/// - `AppError::Logging` when a configured log directory cannot be used.
/// - `AppError::Db` when the database cannot be opened; check
///   `AppError::is_fatal` for the schema-mismatch hard stop.
pub fn launch(config: &AppConfig) -> Result<Launch, AppError> {
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy()).map_err(AppError::Logging)?;
    }

    let conn = open_db(&config.db_path).map_err(|err| {
        if err.is_schema_mismatch() {
            error!("event=app_launch module=app status=error error_code=schema_mismatch error={err}");
        }
        AppError::from(err)
    })?;

    let sweep = spawn_retention_sweep(config.db_path.clone());
    info!(
        "event=app_launch module=app status=ok sweep_started={}",
        sweep.is_some()
    );
    Ok(Launch { conn, sweep })
}

/// Single-context facade over the core use-cases.
pub struct HydApp<'conn, N: NotificationCenter> {
    classifier: TextClassifier,
    reminders: ReminderService<SqliteReminderRepository<'conn>>,
    profile: ProfileService<SqliteProfileStore<'conn>>,
    scheduler: ReminderScheduler<N>,
}

impl<'conn, N: NotificationCenter> HydApp<'conn, N> {
    pub fn new(conn: &'conn Connection, center: N, locale: DateLocale) -> Result<Self, AppError> {
        Self::new_at(conn, center, locale, Local::now())
    }

    /// Builds the facade and loads the profile relative to `now`.
    pub fn new_at(
        conn: &'conn Connection,
        center: N,
        locale: DateLocale,
        now: DateTime<Local>,
    ) -> Result<Self, AppError> {
        let classifier = TextClassifier::new(locale);
        info!(
            "event=app_init module=app status=ok date_detector={}",
            classifier.has_detector()
        );
        Ok(Self {
            classifier,
            reminders: ReminderService::new(SqliteReminderRepository::new(conn)),
            profile: ProfileService::load_at(SqliteProfileStore::new(conn), now)?,
            scheduler: ReminderScheduler::new(center),
        })
    }

    pub fn scheduler(&self) -> &ReminderScheduler<N> {
        &self.scheduler
    }

    /// Classifies free text into a proposal awaiting confirmation.
    pub fn propose(&self, text: &str) -> Proposal {
        self.classifier.analyze(text)
    }

    pub fn propose_at(&self, text: &str, now: DateTime<Local>) -> Proposal {
        self.classifier.analyze_at(text, now)
    }

    /// Stores a confirmed proposal and schedules its reminders.
    pub fn confirm_at(
        &self,
        proposal: &Proposal,
        now: DateTime<Local>,
    ) -> Result<(ReminderItem, ScheduleReport), ReminderServiceError> {
        let item = self.reminders.create_from_proposal(proposal)?;
        let report = self.scheduler.schedule_at(&item, now);
        Ok((item, report))
    }

    pub fn confirm(
        &self,
        proposal: &Proposal,
    ) -> Result<(ReminderItem, ScheduleReport), ReminderServiceError> {
        self.confirm_at(proposal, Local::now())
    }

    /// Direct entry without the classifier.
    pub fn add_reminder_at(
        &self,
        title: &str,
        due_at: DateTime<Local>,
        task_type: TaskType,
        now: DateTime<Local>,
    ) -> Result<(ReminderItem, ScheduleReport), ReminderServiceError> {
        let item = self.reminders.create_reminder(title, due_at, task_type)?;
        let report = self.scheduler.schedule_at(&item, now);
        Ok((item, report))
    }

    /// Completes a reminder, awards points once and drops its pending
    /// notifications.
    pub fn complete_at(
        &mut self,
        id: ReminderId,
        now: DateTime<Local>,
    ) -> Result<CompletionOutcome, ReminderServiceError> {
        let outcome = self
            .reminders
            .complete_and_award_at(id, &mut self.profile, now)?;
        if outcome.award.is_some() {
            self.scheduler.cancel(id);
        }
        Ok(outcome)
    }

    pub fn complete(&mut self, id: ReminderId) -> Result<CompletionOutcome, ReminderServiceError> {
        self.complete_at(id, Local::now())
    }

    pub fn active_reminders(&self) -> RepoResult<Vec<ReminderItem>> {
        self.reminders.list_active()
    }

    pub fn completed_reminders(&self) -> RepoResult<Vec<ReminderItem>> {
        self.reminders.list_completed()
    }

    pub fn stats(&self) -> RepoResult<ReminderStats> {
        self.reminders.stats()
    }

    pub fn profile(&self) -> &UserProfile {
        self.profile.profile()
    }

    pub fn rank(&self) -> UserRank {
        self.profile.rank()
    }

    pub fn set_user_name(&mut self, name: &str) -> Result<(), ProfileError> {
        self.profile.set_user_name(name)
    }

    pub fn set_profile_image(&mut self, image: Option<Vec<u8>>) -> Result<(), ProfileError> {
        self.profile.set_profile_image(image)
    }

    pub fn set_mood(&mut self, mood: Mood) -> Result<(), ProfileError> {
        self.set_mood_at(mood, Local::now())
    }

    pub fn set_mood_at(&mut self, mood: Mood, now: DateTime<Local>) -> Result<(), ProfileError> {
        self.profile.set_mood_at(mood, now)
    }

    /// Whether the shell should show the mood picker instead of the dashboard.
    pub fn needs_mood(&self) -> bool {
        self.profile.mood().is_none()
    }

    pub fn celebration_active_at(&self, now: DateTime<Local>) -> bool {
        self.profile.celebration().is_active_at(now)
    }
}
