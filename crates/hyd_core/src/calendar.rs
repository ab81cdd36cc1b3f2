//! Local-calendar helpers shared by classifier, scoring and scheduling.
//!
//! All day arithmetic happens on local calendar dates so that "3 days
//! before" keeps the wall-clock time across DST changes.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Epoch milliseconds used by the storage layer.
pub fn to_epoch_ms(value: DateTime<Local>) -> i64 {
    value.timestamp_millis()
}

pub fn from_epoch_ms(value: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(value).single()
}

/// Resolves a wall-clock date-time in the local zone.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are pushed forward one hour.
pub fn resolve_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
}

pub fn at_time(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Local>> {
    resolve_local(date.and_time(time))
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn calendar_days_between(from: DateTime<Local>, to: DateTime<Local>) -> i64 {
    (to.date_naive() - from.date_naive()).num_days()
}

/// Moves `value` back `days` calendar days, keeping its time-of-day.
pub fn days_before(value: DateTime<Local>, days: u32) -> Option<DateTime<Local>> {
    let date = value.date_naive().checked_sub_days(Days::new(u64::from(days)))?;
    at_time(date, value.time())
}

pub fn days_after(value: DateTime<Local>, days: u32) -> Option<DateTime<Local>> {
    let date = value.date_naive().checked_add_days(Days::new(u64::from(days)))?;
    at_time(date, value.time())
}
