//! Launch-time history cleanup.
//!
//! # Responsibility
//! - Delete completed reminders whose due date is more than
//!   `RETENTION_DAYS` calendar days in the past.
//! - Run off the caller's context at launch without ever failing it.
//!
//! # Invariants
//! - Open reminders are never deleted, however old.
//! - Sweep failures are logged and dropped; the next launch retries.

use crate::calendar;
use crate::db::open_db;
use crate::repo::reminder_repo::{ReminderRepository, RepoResult, SqliteReminderRepository};
use chrono::{DateTime, Local};
use log::{info, warn};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

pub const RETENTION_DAYS: u32 = 7;

/// Oldest due time a completed reminder may have and still be kept.
pub fn retention_cutoff(now: DateTime<Local>) -> DateTime<Local> {
    calendar::days_before(now, RETENTION_DAYS)
        .unwrap_or_else(|| now - chrono::Duration::days(i64::from(RETENTION_DAYS)))
}

pub fn purge_expired<R: ReminderRepository + ?Sized>(
    repo: &R,
    now: DateTime<Local>,
) -> RepoResult<usize> {
    repo.purge_completed_before(retention_cutoff(now))
}

/// Runs the sweep on a worker thread with its own connection.
///
/// Returns `None` when the worker could not be started; that failure is
/// logged like any other sweep failure.
pub fn spawn_retention_sweep(db_path: PathBuf) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("hyd-retention".to_string())
        .spawn(move || run_sweep(db_path, Local::now()));

    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("event=retention_sweep module=retention status=error stage=spawn error={err}");
            None
        }
    }
}

fn run_sweep(db_path: PathBuf, now: DateTime<Local>) {
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=retention_sweep module=retention status=error stage=open error={err}");
            return;
        }
    };

    let repo = SqliteReminderRepository::new(&conn);
    match purge_expired(&repo, now) {
        Ok(removed) => {
            info!("event=retention_sweep module=retention status=ok removed={removed}");
        }
        Err(err) => {
            warn!("event=retention_sweep module=retention status=error stage=purge error={err}");
        }
    }
}
