//! Completion reward rules.
//!
//! # Invariants
//! - Rewards are pure functions of category, completion time and due time.
//! - The early-completion bonus counts local calendar days, not elapsed
//!   24-hour periods.

use crate::calendar::calendar_days_between;
use crate::model::reminder::TaskType;
use chrono::{DateTime, Local};

/// `(min days early, bonus)`, checked top to bottom.
const EARLY_BONUS_TIERS: [(i64, u32); 2] = [(7, 10), (3, 5)];

/// Bonus for finishing `days_early` calendar days before due.
pub fn early_bonus_for_days(days_early: i64) -> u32 {
    EARLY_BONUS_TIERS
        .iter()
        .find(|(min_days, _)| days_early >= *min_days)
        .map_or(0, |(_, bonus)| *bonus)
}

pub fn completion_bonus(now: DateTime<Local>, due_at: DateTime<Local>) -> u32 {
    early_bonus_for_days(calendar_days_between(now, due_at))
}

/// Base category points plus the early-completion bonus.
pub fn completion_points(
    task_type: TaskType,
    now: DateTime<Local>,
    due_at: DateTime<Local>,
) -> u32 {
    task_type.base_points() + completion_bonus(now, due_at)
}

#[cfg(test)]
mod tests {
    use super::{completion_points, early_bonus_for_days};
    use crate::model::reminder::TaskType;
    use chrono::{Duration, Local};

    #[test]
    fn bonus_tiers_switch_at_exact_days() {
        assert_eq!(early_bonus_for_days(-4), 0);
        assert_eq!(early_bonus_for_days(2), 0);
        assert_eq!(early_bonus_for_days(3), 5);
        assert_eq!(early_bonus_for_days(6), 5);
        assert_eq!(early_bonus_for_days(7), 10);
        assert_eq!(early_bonus_for_days(40), 10);
    }

    #[test]
    fn ten_days_early_adds_full_bonus() {
        let now = Local::now();
        let due = now + Duration::days(10);
        assert_eq!(completion_points(TaskType::Homework, now, due), 25);
        assert_eq!(completion_points(TaskType::Reminder, now, due), 15);
    }

    #[test]
    fn overdue_completion_earns_base_only() {
        let now = Local::now();
        let due = now - Duration::days(2);
        assert_eq!(completion_points(TaskType::Event, now, due), 10);
    }
}
