use chrono::{DateTime, Duration, Local, TimeZone};
use hyd_core::db::open_db;
use hyd_core::{Mood, ProfileService, SqliteProfileStore, UserRank};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap()
}

#[test]
fn fresh_profile_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("hyd.sqlite3")).unwrap();

    let now = at(2026, 3, 11, 10);
    let service = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
    let profile = service.profile();

    assert_eq!(profile.user_name, "Usuario");
    assert_eq!(profile.points, 0);
    assert_eq!(profile.profile_image, None);
    assert_eq!(profile.mood, None);
    assert_eq!(service.rank(), UserRank::Beginner);
}

#[test]
fn profile_fields_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyd.sqlite3");
    let now = at(2026, 3, 11, 10);

    {
        let conn = open_db(&path).unwrap();
        let mut service = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
        service.set_user_name("  Ana  ").unwrap();
        service.set_profile_image(Some(vec![0xFF, 0xD8, 0xFF])).unwrap();
        service.award_points_at(120, now).unwrap();
        service.set_mood_at(Mood::Energized, now).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = ProfileService::load_at(
        SqliteProfileStore::new(&conn),
        now + Duration::hours(3),
    )
    .unwrap();
    let profile = service.profile();

    assert_eq!(profile.user_name, "Ana");
    assert_eq!(profile.profile_image.as_deref(), Some(&[0xFF, 0xD8, 0xFF][..]));
    assert_eq!(profile.points, 120);
    assert_eq!(service.rank(), UserRank::HardWorker);
    assert_eq!(profile.mood, Some(Mood::Energized));
}

#[test]
fn mood_resets_on_a_new_day_but_points_remain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyd.sqlite3");
    let monday = at(2026, 3, 9, 22);

    {
        let conn = open_db(&path).unwrap();
        let mut service = ProfileService::load_at(SqliteProfileStore::new(&conn), monday).unwrap();
        service.set_mood_at(Mood::Sad, monday).unwrap();
        service.award_points_at(15, monday).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let tuesday = at(2026, 3, 10, 7);
    let mut service = ProfileService::load_at(SqliteProfileStore::new(&conn), tuesday).unwrap();
    assert_eq!(service.mood(), None);
    assert_eq!(service.points(), 15);

    service.set_mood_at(Mood::Happy, tuesday).unwrap();
    assert_eq!(service.profile().last_login_on, Some(tuesday.date_naive()));
}

#[test]
fn clearing_the_image_removes_it_from_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hyd.sqlite3");
    let now = at(2026, 3, 11, 10);

    {
        let conn = open_db(&path).unwrap();
        let mut service = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
        service.set_profile_image(Some(vec![1, 2, 3])).unwrap();
        service.set_profile_image(None).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
    assert_eq!(service.profile().profile_image, None);
}
