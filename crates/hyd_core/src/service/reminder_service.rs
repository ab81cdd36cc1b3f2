//! Reminder use-case service.
//!
//! # Responsibility
//! - Create reminders from confirmed proposals or direct entry.
//! - Complete reminders and award points exactly once per completion.
//! - Serve the active/completed lists and completion statistics.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Points are awarded only when the repository reports a state change
//!   from open to completed.
//! - The completion and the new point total commit together or not at all;
//!   a failed award leaves the reminder open so a retry can award it.

use crate::classifier::Proposal;
use crate::model::reminder::{ReminderId, ReminderItem, TaskType};
use crate::repo::profile_repo::ProfileStore;
use crate::repo::reminder_repo::{ReminderListQuery, ReminderRepository, RepoError, RepoResult};
use crate::service::profile_service::{AwardOutcome, ProfileError, ProfileService};
use crate::service::retention;
use crate::service::scoring::completion_points;
use chrono::{DateTime, Local};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for reminder use-cases.
#[derive(Debug)]
pub enum ReminderServiceError {
    /// Target reminder does not exist.
    ReminderNotFound(ReminderId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Points could not be persisted after completion.
    Profile(ProfileError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ReminderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReminderNotFound(id) => write!(f, "reminder not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Profile(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent reminder state: {details}")
            }
        }
    }
}

impl Error for ReminderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Profile(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReminderServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ReminderNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ProfileError> for ReminderServiceError {
    fn from(value: ProfileError) -> Self {
        Self::Profile(value)
    }
}

/// Completion counters for the statistics view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderStats {
    pub active: u32,
    pub completed: u32,
    /// `completed / (active + completed)`, `0.0` when there are none.
    pub completion_ratio: f64,
}

/// Result of a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub reminder: ReminderItem,
    /// `None` when the reminder had already been completed.
    pub award: Option<AwardOutcome>,
}

/// Reminder service facade over repository implementations.
pub struct ReminderService<R: ReminderRepository> {
    repo: R,
}

impl<R: ReminderRepository> ReminderService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a confirmed classifier proposal.
    pub fn create_from_proposal(
        &self,
        proposal: &Proposal,
    ) -> Result<ReminderItem, ReminderServiceError> {
        self.create_reminder(proposal.title.clone(), proposal.due_at, proposal.task_type)
    }

    /// Creates an open reminder with a fresh stable ID.
    pub fn create_reminder(
        &self,
        title: impl Into<String>,
        due_at: DateTime<Local>,
        task_type: TaskType,
    ) -> Result<ReminderItem, ReminderServiceError> {
        let item = ReminderItem::new(title, due_at, task_type);
        let id = self.repo.create_reminder(&item)?;
        self.repo
            .get_reminder(id)?
            .ok_or(ReminderServiceError::InconsistentState(
                "created reminder not found in read-back",
            ))
    }

    pub fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<ReminderItem>> {
        self.repo.get_reminder(id)
    }

    /// Open reminders, soonest due first.
    pub fn list_active(&self) -> RepoResult<Vec<ReminderItem>> {
        self.repo.list_reminders(&ReminderListQuery::active())
    }

    /// Completed reminders, latest due first.
    pub fn list_completed(&self) -> RepoResult<Vec<ReminderItem>> {
        self.repo.list_reminders(&ReminderListQuery::completed())
    }

    pub fn stats(&self) -> RepoResult<ReminderStats> {
        let counts = self.repo.counts()?;
        let total = counts.active + counts.completed;
        let completion_ratio = if total == 0 {
            0.0
        } else {
            f64::from(counts.completed) / f64::from(total)
        };
        Ok(ReminderStats {
            active: counts.active,
            completed: counts.completed,
            completion_ratio,
        })
    }

    /// Completes a reminder and awards its points, at most once.
    ///
    /// Completing an already-completed reminder returns the stored record
    /// with `award = None` and leaves the profile untouched.
    pub fn complete_and_award_at<S: ProfileStore>(
        &self,
        id: ReminderId,
        profile: &mut ProfileService<S>,
        now: DateTime<Local>,
    ) -> Result<CompletionOutcome, ReminderServiceError> {
        let reminder = self
            .repo
            .get_reminder(id)?
            .ok_or(ReminderServiceError::ReminderNotFound(id))?;

        let points = completion_points(reminder.task_type, now, reminder.due_at);
        let committed = if reminder.is_completed {
            None
        } else {
            self.repo.atomically(|| -> Result<_, ReminderServiceError> {
                if !self.repo.mark_completed(id, now)? {
                    return Ok(None);
                }
                Ok(Some(profile.persist_award(points)?))
            })?
        };

        let Some(award) = committed else {
            info!("event=reminder_complete module=reminder status=skip reason=already_completed");
            let stored = self
                .repo
                .get_reminder(id)?
                .ok_or(ReminderServiceError::ReminderNotFound(id))?;
            return Ok(CompletionOutcome {
                reminder: stored,
                award: None,
            });
        };

        profile.apply_award(&award, now);
        let reminder = self
            .repo
            .get_reminder(id)?
            .ok_or(ReminderServiceError::InconsistentState(
                "completed reminder not found in read-back",
            ))?;

        info!(
            "event=reminder_complete module=reminder status=ok task_type={} points={} rank_changed={}",
            reminder.task_type,
            points,
            award.rank_changed()
        );

        Ok(CompletionOutcome {
            reminder,
            award: Some(award),
        })
    }

    pub fn complete_and_award<S: ProfileStore>(
        &self,
        id: ReminderId,
        profile: &mut ProfileService<S>,
    ) -> Result<CompletionOutcome, ReminderServiceError> {
        self.complete_and_award_at(id, profile, Local::now())
    }

    /// Deletes completed reminders past the retention window.
    pub fn purge_expired_at(&self, now: DateTime<Local>) -> RepoResult<usize> {
        retention::purge_expired(&self.repo, now)
    }
}
