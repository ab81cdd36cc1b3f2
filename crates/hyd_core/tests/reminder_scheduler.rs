use chrono::{DateTime, Duration, Local, TimeZone};
use hyd_core::notify::plan_notifications;
use hyd_core::{InMemoryNotificationCenter, ReminderItem, ReminderScheduler, TaskType};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap()
}

#[test]
fn due_far_ahead_schedules_every_offset() {
    let now = at(2026, 3, 1, 10);
    let item = ReminderItem::new("Concierto", at(2026, 3, 20, 21), TaskType::Event);
    let scheduler = ReminderScheduler::new(InMemoryNotificationCenter::new());

    let report = scheduler.schedule_at(&item, now);

    assert_eq!(report.scheduled.len(), 4);
    assert!(report.failed.is_empty());
    assert!(report.skipped_offsets.is_empty());

    let pending = scheduler.center().pending();
    let bodies: Vec<&str> = pending.iter().map(|request| request.body.as_str()).collect();
    assert!(bodies.contains(&"Faltan 7 días para: Concierto"));
    assert!(bodies.contains(&"Faltan 3 días para: Concierto"));
    assert!(bodies.contains(&"Mañana: Concierto"));
    assert!(bodies.contains(&"¡Es ahora! Concierto"));
    assert!(pending.iter().all(|request| request.title == "Evento"));
}

#[test]
fn due_in_two_days_skips_the_earlier_offsets() {
    let now = at(2026, 3, 11, 10);
    let item = ReminderItem::new("Reunión", at(2026, 3, 13, 9), TaskType::Appointment);

    let fire_times: Vec<DateTime<Local>> = plan_notifications(&item, now)
        .into_iter()
        .map(|request| request.fire_at)
        .collect();

    assert_eq!(fire_times, vec![at(2026, 3, 12, 9), at(2026, 3, 13, 9)]);
}

#[test]
fn past_or_present_due_schedules_nothing() {
    let now = at(2026, 3, 11, 10);
    let scheduler = ReminderScheduler::new(InMemoryNotificationCenter::new());

    let due_now = ReminderItem::new("ahora", now, TaskType::Reminder);
    let overdue = ReminderItem::new("tarde", now - Duration::hours(3), TaskType::Reminder);

    let report = scheduler.schedule_at(&due_now, now);
    assert!(report.scheduled.is_empty());
    assert_eq!(report.skipped_offsets, vec![7, 3, 1, 0]);
    assert!(scheduler.schedule_at(&overdue, now).scheduled.is_empty());
    assert!(scheduler.center().is_empty());
}

#[test]
fn triggers_carry_local_calendar_fields() {
    let now = at(2026, 3, 11, 10);
    let item = ReminderItem::new("Examen", at(2026, 3, 11, 18), TaskType::Homework);

    let requests = plan_notifications(&item, now);
    assert_eq!(requests.len(), 1);
    let trigger = requests[0].trigger;
    assert_eq!((trigger.year, trigger.month, trigger.day), (2026, 3, 11));
    assert_eq!((trigger.hour, trigger.minute), (18, 0));
    assert!(!trigger.repeats);
}

#[test]
fn denied_center_does_not_fail_the_batch() {
    let now = at(2026, 3, 1, 10);
    let item = ReminderItem::new("Cumpleaños", at(2026, 3, 20, 12), TaskType::Event);
    let scheduler = ReminderScheduler::new(InMemoryNotificationCenter::denied());

    let report = scheduler.schedule_at(&item, now);

    assert!(report.scheduled.is_empty());
    assert_eq!(report.failed.len(), 4);
}

#[test]
fn rescheduling_replaces_and_cancel_clears() {
    let now = at(2026, 3, 1, 10);
    let item = ReminderItem::new("Disco", at(2026, 3, 20, 23), TaskType::Event);
    let scheduler = ReminderScheduler::new(InMemoryNotificationCenter::new());

    scheduler.schedule_at(&item, now);
    scheduler.schedule_at(&item, now);
    assert_eq!(scheduler.center().len(), 4);

    let other = ReminderItem::new("Otra cosa", at(2026, 3, 25, 9), TaskType::Reminder);
    scheduler.schedule_at(&other, now);
    assert_eq!(scheduler.center().len(), 8);

    scheduler.cancel(item.id);
    let remaining = scheduler.center().pending();
    assert_eq!(remaining.len(), 4);
    assert!(remaining
        .iter()
        .all(|request| request.identifier.starts_with(&other.id.to_string())));
}
