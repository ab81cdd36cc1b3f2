//! Before-due reminder scheduling.

use super::{CalendarTrigger, NotificationCenter, NotificationRequest};
use crate::calendar;
use crate::model::reminder::{ReminderId, ReminderItem};
use chrono::{DateTime, Local};
use log::{info, warn};

/// Days before due at which a reminder fires; `0` is the due moment itself.
pub const REMINDER_OFFSETS_DAYS: [u32; 4] = [7, 3, 1, 0];

/// Outcome of one scheduling batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub scheduled: Vec<String>,
    pub failed: Vec<String>,
    /// Offsets dropped because their fire time was not in the future.
    pub skipped_offsets: Vec<u32>,
}

/// Builds the requests for every offset whose fire time is after `now`.
pub fn plan_notifications(item: &ReminderItem, now: DateTime<Local>) -> Vec<NotificationRequest> {
    REMINDER_OFFSETS_DAYS
        .iter()
        .filter_map(|&offset| {
            let fire_at = calendar::days_before(item.due_at, offset)?;
            (fire_at > now).then(|| NotificationRequest {
                identifier: request_identifier(item.id, offset),
                title: item.task_type.label().to_string(),
                body: body_for_offset(offset, &item.title),
                fire_at,
                trigger: CalendarTrigger::once_at(fire_at),
            })
        })
        .collect()
}

pub(crate) fn request_identifier(id: ReminderId, offset: u32) -> String {
    format!("{id}-{offset}")
}

fn body_for_offset(offset: u32, title: &str) -> String {
    match offset {
        0 => format!("¡Es ahora! {title}"),
        1 => format!("Mañana: {title}"),
        days => format!("Faltan {days} días para: {title}"),
    }
}

/// Delivers planned reminders to a notification center.
pub struct ReminderScheduler<N: NotificationCenter> {
    center: N,
}

impl<N: NotificationCenter> ReminderScheduler<N> {
    pub fn new(center: N) -> Self {
        Self { center }
    }

    pub fn center(&self) -> &N {
        &self.center
    }

    /// Schedules reminders for `item` relative to the current time.
    pub fn schedule(&self, item: &ReminderItem) -> ScheduleReport {
        self.schedule_at(item, Local::now())
    }

    /// Schedules every future offset; a rejected request does not stop the
    /// remaining ones.
    pub fn schedule_at(&self, item: &ReminderItem, now: DateTime<Local>) -> ScheduleReport {
        let planned = plan_notifications(item, now);
        let mut report = ScheduleReport {
            skipped_offsets: REMINDER_OFFSETS_DAYS
                .iter()
                .copied()
                .filter(|offset| {
                    let identifier = request_identifier(item.id, *offset);
                    !planned.iter().any(|request| request.identifier == identifier)
                })
                .collect(),
            ..ScheduleReport::default()
        };

        for request in planned {
            let identifier = request.identifier.clone();
            match self.center.add(request) {
                Ok(()) => report.scheduled.push(identifier),
                Err(err) => {
                    warn!(
                        "event=notification_schedule module=notify status=error id={} error={}",
                        identifier, err
                    );
                    report.failed.push(identifier);
                }
            }
        }

        info!(
            "event=notification_schedule module=notify status=ok reminder_id={} scheduled={} failed={} skipped={}",
            item.id,
            report.scheduled.len(),
            report.failed.len(),
            report.skipped_offsets.len()
        );
        report
    }

    /// Drops every pending request for `id`.
    pub fn cancel(&self, id: ReminderId) {
        let identifiers = REMINDER_OFFSETS_DAYS
            .iter()
            .map(|offset| request_identifier(id, *offset))
            .collect::<Vec<_>>();
        self.center.remove_pending(&identifiers);
    }
}

#[cfg(test)]
mod tests {
    use super::{body_for_offset, plan_notifications};
    use crate::model::reminder::{ReminderItem, TaskType};
    use chrono::{Duration, Local};

    #[test]
    fn bodies_follow_offset_wording() {
        assert_eq!(body_for_offset(0, "Examen"), "¡Es ahora! Examen");
        assert_eq!(body_for_offset(1, "Examen"), "Mañana: Examen");
        assert_eq!(body_for_offset(3, "Examen"), "Faltan 3 días para: Examen");
        assert_eq!(body_for_offset(7, "Examen"), "Faltan 7 días para: Examen");
    }

    #[test]
    fn far_future_reminder_gets_all_offsets() {
        let now = Local::now();
        let item = ReminderItem::new("boda", now + Duration::days(30), TaskType::Event);
        let planned = plan_notifications(&item, now);

        let identifiers = planned
            .iter()
            .map(|request| request.identifier.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            identifiers,
            vec![
                format!("{}-7", item.id),
                format!("{}-3", item.id),
                format!("{}-1", item.id),
                format!("{}-0", item.id),
            ]
        );
        assert!(planned.iter().all(|request| request.title == "Evento"));
        assert!(planned.iter().all(|request| !request.trigger.repeats));
    }
}
