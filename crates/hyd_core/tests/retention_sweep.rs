use chrono::{DateTime, Duration, Local};
use hyd_core::db::open_db;
use hyd_core::service::retention::spawn_retention_sweep;
use hyd_core::{
    launch, AppConfig, ReminderItem, ReminderRepository, SqliteReminderRepository, TaskType,
};
use std::path::Path;

fn seed_completed(path: &Path, now: DateTime<Local>, days_ago: i64) -> ReminderItem {
    let conn = open_db(path).unwrap();
    let repo = SqliteReminderRepository::new(&conn);
    let mut item = ReminderItem::new(
        format!("hace {days_ago} días"),
        now - Duration::days(days_ago),
        TaskType::Reminder,
    );
    item.complete(now - Duration::days(days_ago));
    repo.create_reminder(&item).unwrap();
    item
}

#[test]
fn worker_sweep_removes_only_expired_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyd.sqlite3");
    let now = Local::now();

    let expired = seed_completed(&path, now, 8);
    let recent = seed_completed(&path, now, 6);
    let conn = open_db(&path).unwrap();

    spawn_retention_sweep(path.clone()).unwrap().join().unwrap();

    let repo = SqliteReminderRepository::new(&conn);
    assert!(repo.get_reminder(expired.id).unwrap().is_none());
    assert!(repo.get_reminder(recent.id).unwrap().is_some());
}

#[test]
fn launch_sweep_runs_against_the_opened_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyd.sqlite3");
    let now = Local::now();

    let expired = seed_completed(&path, now, 30);
    let recent = seed_completed(&path, now, 1);

    let mut launched = launch(&AppConfig::new(&path)).unwrap();
    launched.wait_for_sweep();

    let repo = SqliteReminderRepository::new(&launched.conn);
    assert!(repo.get_reminder(expired.id).unwrap().is_none());
    assert!(repo.get_reminder(recent.id).unwrap().is_some());
}

#[test]
fn unopenable_path_ends_the_sweep_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("hyd.sqlite3");

    let handle = spawn_retention_sweep(path.clone()).unwrap();

    assert!(handle.join().is_ok());
    assert!(!path.exists());
}
