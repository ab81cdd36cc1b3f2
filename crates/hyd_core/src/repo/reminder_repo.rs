//! Reminder repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable insert/complete/query/purge APIs over `reminders`.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths call `ReminderItem::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Completion is a conditional update, so a record is completed at most
//!   once no matter how often callers retry.
//! - `atomically` wraps a unit of work in a savepoint on the shared
//!   connection; profile writes made through the same connection inside it
//!   roll back together with the completion.

use crate::calendar::{from_epoch_ms, to_epoch_ms};
use crate::db::DbError;
use crate::model::reminder::{ReminderId, ReminderItem, ReminderValidationError, TaskType};
use chrono::{DateTime, Local};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const UNIT_SAVEPOINT: &str = "hyd_unit";

const REMINDER_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    due_at,
    task_type,
    is_completed,
    completed_at
FROM reminders";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for reminder and profile persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReminderValidationError),
    Db(DbError),
    NotFound(ReminderId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "reminder not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ReminderValidationError> for RepoError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sort direction over `due_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueOrder {
    #[default]
    Ascending,
    Descending,
}

/// Query options for listing reminders.
#[derive(Debug, Clone, Default)]
pub struct ReminderListQuery {
    /// `None` lists both open and completed reminders.
    pub completed: Option<bool>,
    pub order: DueOrder,
    pub limit: Option<u32>,
}

impl ReminderListQuery {
    /// Open reminders, soonest first.
    pub fn active() -> Self {
        Self {
            completed: Some(false),
            order: DueOrder::Ascending,
            limit: None,
        }
    }

    /// Completed reminders, latest due first.
    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            order: DueOrder::Descending,
            limit: None,
        }
    }
}

/// Open/completed totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReminderCounts {
    pub active: u32,
    pub completed: u32,
}

/// Repository interface for reminder records.
pub trait ReminderRepository {
    fn create_reminder(&self, item: &ReminderItem) -> RepoResult<ReminderId>;
    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<ReminderItem>>;
    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<Vec<ReminderItem>>;
    /// Returns `false` when the reminder was already completed.
    fn mark_completed(&self, id: ReminderId, at: DateTime<Local>) -> RepoResult<bool>;
    /// Deletes completed reminders due strictly before `cutoff`.
    fn purge_completed_before(&self, cutoff: DateTime<Local>) -> RepoResult<usize>;
    fn counts(&self) -> RepoResult<ReminderCounts>;

    /// Runs `work` as one all-or-nothing unit; an `Err` undoes every write
    /// made inside it.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
        Self: Sized;
}

/// SQLite-backed reminder repository.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn rollback_unit(&self) {
        let sql = format!("ROLLBACK TO {UNIT_SAVEPOINT}; RELEASE {UNIT_SAVEPOINT};");
        if let Err(err) = self.conn.execute_batch(&sql) {
            warn!("event=repo_unit module=reminder status=error stage=rollback error={err}");
        }
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn create_reminder(&self, item: &ReminderItem) -> RepoResult<ReminderId> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO reminders (
                uuid,
                title,
                due_at,
                task_type,
                is_completed,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                item.id.to_string(),
                item.title.as_str(),
                to_epoch_ms(item.due_at),
                item.task_type.as_tag(),
                bool_to_int(item.is_completed),
                item.completed_at.map(to_epoch_ms),
            ],
        )?;

        Ok(item.id)
    }

    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<ReminderItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reminder_row(row)?));
        }

        Ok(None)
    }

    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<Vec<ReminderItem>> {
        let mut sql = format!("{REMINDER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(completed) = query.completed {
            sql.push_str(" AND is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        match query.order {
            DueOrder::Ascending => sql.push_str(" ORDER BY due_at ASC, uuid ASC"),
            DueOrder::Descending => sql.push_str(" ORDER BY due_at DESC, uuid ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_reminder_row(row)?);
        }

        Ok(items)
    }

    fn mark_completed(&self, id: ReminderId, at: DateTime<Local>) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE reminders
             SET
                is_completed = 1,
                completed_at = ?1
             WHERE uuid = ?2 AND is_completed = 0;",
            params![to_epoch_ms(at), id.to_string()],
        )?;

        if changed > 0 {
            return Ok(true);
        }

        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM reminders WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(false)
    }

    fn purge_completed_before(&self, cutoff: DateTime<Local>) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM reminders WHERE is_completed = 1 AND due_at < ?1;",
            [to_epoch_ms(cutoff)],
        )?;
        Ok(removed)
    }

    fn counts(&self) -> RepoResult<ReminderCounts> {
        let (active, completed): (i64, i64) = self.conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN is_completed = 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN is_completed = 1 THEN 1 ELSE 0 END), 0)
             FROM reminders;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(ReminderCounts {
            active: count_to_u32(active, "active")?,
            completed: count_to_u32(completed, "completed")?,
        })
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {UNIT_SAVEPOINT};"))
            .map_err(RepoError::from)?;

        match work() {
            Ok(value) => match self
                .conn
                .execute_batch(&format!("RELEASE {UNIT_SAVEPOINT};"))
            {
                Ok(()) => Ok(value),
                Err(err) => {
                    self.rollback_unit();
                    Err(RepoError::from(err).into())
                }
            },
            Err(err) => {
                self.rollback_unit();
                Err(err)
            }
        }
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<ReminderItem> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in reminders.uuid"))
    })?;

    let type_text: String = row.get("task_type")?;
    let task_type = TaskType::from_tag(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task type `{type_text}` in reminders.task_type"
        ))
    })?;

    let due_ms: i64 = row.get("due_at")?;
    let due_at = parse_timestamp(due_ms, "due_at")?;

    let completed_at = match row.get::<_, Option<i64>>("completed_at")? {
        Some(value) => Some(parse_timestamp(value, "completed_at")?),
        None => None,
    };

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in reminders.is_completed"
            )));
        }
    };

    let item = ReminderItem {
        id,
        title: row.get("title")?,
        due_at,
        task_type,
        is_completed,
        completed_at,
    };
    item.validate()?;
    Ok(item)
}

fn parse_timestamp(value: i64, column: &str) -> RepoResult<DateTime<Local>> {
    from_epoch_ms(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "timestamp `{value}` out of range in reminders.{column}"
        ))
    })
}

fn count_to_u32(value: i64, label: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("{label} count `{value}` out of range")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
