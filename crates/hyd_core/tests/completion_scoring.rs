use chrono::{DateTime, Duration, Local, TimeZone};
use hyd_core::db::open_db_in_memory;
use hyd_core::{
    ProfileService, ProfileStore, ProfileValue, ReminderService, ReminderServiceError, RepoError,
    RepoResult, SqliteProfileStore, SqliteReminderRepository, TaskType, UserRank,
};
use std::cell::Cell;

/// Profile store whose next write fails once.
struct FailingOnceStore<'conn> {
    inner: SqliteProfileStore<'conn>,
    fail_next_set: Cell<bool>,
}

impl ProfileStore for FailingOnceStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<ProfileValue>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: ProfileValue) -> RepoResult<()> {
        if self.fail_next_set.replace(false) {
            return Err(RepoError::InvalidData(format!("write to `{key}` refused")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.inner.remove(key)
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap()
}

#[test]
fn completing_twice_awards_points_once() {
    let conn = open_db_in_memory().unwrap();
    let reminders = ReminderService::new(SqliteReminderRepository::new(&conn));
    let now = at(2026, 3, 11, 10);
    let mut profile = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();

    let item = reminders
        .create_reminder("Cita con el médico", now + Duration::hours(2), TaskType::Appointment)
        .unwrap();

    let first = reminders
        .complete_and_award_at(item.id, &mut profile, now)
        .unwrap();
    let award = first.award.unwrap();
    assert_eq!(award.points_added, 5);
    assert_eq!(award.total_points, 5);
    assert!(first.reminder.is_completed);
    assert_eq!(first.reminder.completed_at, Some(now));

    let second = reminders
        .complete_and_award_at(item.id, &mut profile, now + Duration::minutes(1))
        .unwrap();
    assert!(second.award.is_none());
    assert_eq!(second.reminder.completed_at, Some(now));
    assert_eq!(profile.points(), 5);
}

#[test]
fn finishing_ten_days_early_adds_the_top_bonus() {
    let conn = open_db_in_memory().unwrap();
    let reminders = ReminderService::new(SqliteReminderRepository::new(&conn));
    let now = at(2026, 3, 11, 10);
    let mut profile = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();

    let item = reminders
        .create_reminder("Entrega del informe", now + Duration::days(10), TaskType::Homework)
        .unwrap();
    let outcome = reminders
        .complete_and_award_at(item.id, &mut profile, now)
        .unwrap();

    assert_eq!(outcome.award.unwrap().points_added, 15 + 10);
}

#[test]
fn overdue_completion_earns_only_base_points() {
    let conn = open_db_in_memory().unwrap();
    let reminders = ReminderService::new(SqliteReminderRepository::new(&conn));
    let now = at(2026, 3, 11, 10);
    let mut profile = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();

    let item = reminders
        .create_reminder("Fiesta", now - Duration::days(2), TaskType::Event)
        .unwrap();
    let outcome = reminders
        .complete_and_award_at(item.id, &mut profile, now)
        .unwrap();

    assert_eq!(outcome.award.unwrap().points_added, 10);
}

#[test]
fn crossing_a_rank_threshold_raises_the_celebration() {
    let conn = open_db_in_memory().unwrap();
    let reminders = ReminderService::new(SqliteReminderRepository::new(&conn));
    let now = at(2026, 3, 11, 10);
    let mut profile = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();

    let item = reminders
        .create_reminder("Boda de Laura", now + Duration::hours(5), TaskType::Event)
        .unwrap();
    let award = reminders
        .complete_and_award_at(item.id, &mut profile, now)
        .unwrap()
        .award
        .unwrap();

    assert_eq!(award.previous_rank, UserRank::Beginner);
    assert_eq!(award.rank, UserRank::Apprentice);
    assert!(profile.celebration().is_active_at(now + Duration::seconds(3)));
    assert!(!profile.celebration().is_active_at(now + Duration::seconds(5)));
}

#[test]
fn completing_an_unknown_reminder_fails_without_awarding() {
    let conn = open_db_in_memory().unwrap();
    let reminders = ReminderService::new(SqliteReminderRepository::new(&conn));
    let now = at(2026, 3, 11, 10);
    let mut profile = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
    let missing = uuid::Uuid::new_v4();

    let err = reminders
        .complete_and_award_at(missing, &mut profile, now)
        .unwrap_err();
    assert!(matches!(err, ReminderServiceError::ReminderNotFound(id) if id == missing));
    assert_eq!(profile.points(), 0);
}

#[test]
fn failed_points_write_leaves_reminder_open_for_retry() {
    let conn = open_db_in_memory().unwrap();
    let reminders = ReminderService::new(SqliteReminderRepository::new(&conn));
    let now = at(2026, 3, 11, 10);
    let store = FailingOnceStore {
        inner: SqliteProfileStore::new(&conn),
        fail_next_set: Cell::new(true),
    };
    let mut profile = ProfileService::load_at(store, now).unwrap();

    let item = reminders
        .create_reminder("Estudiar álgebra", now + Duration::hours(4), TaskType::Homework)
        .unwrap();

    let err = reminders
        .complete_and_award_at(item.id, &mut profile, now)
        .unwrap_err();
    assert!(matches!(err, ReminderServiceError::Profile(_)));
    assert!(!reminders.get_reminder(item.id).unwrap().unwrap().is_completed);
    assert_eq!(profile.points(), 0);

    let retry = reminders
        .complete_and_award_at(item.id, &mut profile, now)
        .unwrap();
    assert_eq!(retry.award.unwrap().points_added, 15);
    assert!(retry.reminder.is_completed);
    assert_eq!(profile.points(), 15);

    let reloaded = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
    assert_eq!(reloaded.points(), 15);
}
