//! Natural-language date/time detection.
//!
//! # Responsibility
//! - Locate the first date/time expression in free text and resolve it to a
//!   local instant relative to a caller-provided "now".
//!
//! # Invariants
//! - Detection is pure: same text and `now` always give the same result.
//! - The earliest expression in the text wins; a clock time found anywhere
//!   in the text is merged into a day-level expression.
//! - Day-level expressions without a clock time resolve at `DEFAULT_DAY_TIME`.

use crate::calendar;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, Weekday};
use regex::{Captures, Regex};
use std::cmp::Reverse;
use std::ops::Range;

const DEFAULT_DAY_TIME: (u32, u32) = (12, 0);
const EVENING_TIME: (u32, u32) = (20, 0);

const MONTHS_FULL: &str = "enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|\
octubre|noviembre|diciembre|january|february|march|april|may|june|july|august|september|october|\
november|december";
const MONTHS_EN: &str = "january|february|march|april|may|june|july|august|september|october|\
november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const WEEKDAYS: &str = "lunes|martes|mi[eé]rcoles|jueves|viernes|s[aá]bado|domingo|monday|tuesday|\
wednesday|thursday|friday|saturday|sunday";
const COUNT_WORDS: &str = r"\d{1,3}|una|uno|un|dos|tres|cuatro|cinco|an|a|one|two|three|four|five";

/// Resolved date expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedDate {
    pub at: DateTime<Local>,
    /// Byte range of the expression(s) in the source text.
    pub span: Range<usize>,
}

/// Seam for date detection, so callers can inject platform detectors.
pub trait DateDetector {
    fn detect(&self, text: &str, now: DateTime<Local>) -> Option<DetectedDate>;
}

/// Controls numeric date order (`dd/mm` vs `mm/dd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    #[default]
    Spanish,
    English,
}

impl DateLocale {
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "es" | "es-es" | "es_es" | "spanish" => Some(Self::Spanish),
            "en" | "en-us" | "en_us" | "english" => Some(Self::English),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DateValue {
    Day { date: NaiveDate, default_time: NaiveTime },
    Instant(DateTime<Local>),
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    value: DateValue,
}

#[derive(Debug, Clone, Copy)]
struct ClockMatch {
    start: usize,
    end: usize,
    time: NaiveTime,
    /// "12 de la noche": midnight closing the named day.
    next_day: bool,
}

/// Regex-backed detector for Spanish and English expressions.
#[derive(Debug, Clone)]
pub struct PatternDateDetector {
    locale: DateLocale,
    iso: Regex,
    numeric: Regex,
    day_month: Regex,
    month_day: Regex,
    relative_day: Regex,
    weekday: Regex,
    span: Regex,
    clock: Regex,
}

impl PatternDateDetector {
    /// Compiles all patterns.
    ///
    /// # Errors
    /// - Returns the regex error when a pattern fails to compile; callers
    ///   degrade to "no date found".
    pub fn new(locale: DateLocale) -> Result<Self, regex::Error> {
        Ok(Self {
            locale,
            iso: Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b")?,
            numeric: Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b")?,
            day_month: Regex::new(&format!(
                r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:de\s+|of\s+)?({MONTHS_FULL})(?:,?\s+(?:de\s+)?(\d{{4}}))?\b"
            ))?,
            month_day: Regex::new(&format!(
                r"(?i)\b({MONTHS_EN})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?\b"
            ))?,
            relative_day: Regex::new(
                r"(?i)\b(pasado\s+mañana|day\s+after\s+tomorrow|mañana|tomorrow|hoy|today|tonight|esta\s+noche)\b",
            )?,
            weekday: Regex::new(&format!(
                r"(?i)\b(?:(?:el|este|next|this|on|pr[oó]ximo)\s+)?({WEEKDAYS})\b"
            ))?,
            span: Regex::new(&format!(
                r"(?i)\b(?:en|in|dentro\s+de|within)\s+({COUNT_WORDS})\s+(minutos?|minutes?|mins?|horas?|hours?|hrs?|d[ií]as?|days?|semanas?|weeks?)\b"
            ))?,
            clock: Regex::new(
                r"(?i)(?P<prefix>\b(?:a\s+las?|at)\s+)?\b(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?(?:\s*(?P<meridiem>[ap]m\b|[ap]\.m\.))?(?:\s+(?P<period>de\s+la\s+(?:mañana|tarde|noche)))?",
            )?,
        })
    }

    fn date_candidates(&self, text: &str, now: DateTime<Local>) -> Vec<Candidate> {
        let today = now.date_naive();
        let noon = time_of(DEFAULT_DAY_TIME);
        let mut found = Vec::new();

        let mut push_first = |regex: &Regex, parse: &dyn Fn(&Captures<'_>) -> Option<DateValue>| {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if let Some(value) = parse(&caps) {
                    found.push(Candidate {
                        start: whole.start(),
                        end: whole.end(),
                        value,
                    });
                    break;
                }
            }
        };

        push_first(&self.iso, &|caps| {
            let date = NaiveDate::from_ymd_opt(
                number(caps, 1)?,
                number(caps, 2)?,
                number(caps, 3)?,
            )?;
            Some(day(date, noon))
        });

        push_first(&self.numeric, &|caps| {
            let (first, second): (u32, u32) = (number(caps, 1)?, number(caps, 2)?);
            let (day_of_month, month) = match self.locale {
                DateLocale::Spanish => (first, second),
                DateLocale::English => (second, first),
            };
            let year = caps.get(3).and_then(|m| expand_year(m.as_str()));
            Some(day(resolve_month_day(today, month, day_of_month, year)?, noon))
        });

        push_first(&self.day_month, &|caps| {
            let month = month_number(caps.get(2)?.as_str())?;
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            Some(day(resolve_month_day(today, month, number(caps, 1)?, year)?, noon))
        });

        push_first(&self.month_day, &|caps| {
            let month = month_number(caps.get(1)?.as_str())?;
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            Some(day(resolve_month_day(today, month, number(caps, 2)?, year)?, noon))
        });

        push_first(&self.relative_day, &|caps| {
            let whole = caps.get(0)?;
            let word = collapse_spaces(whole.as_str());
            let (offset, default_time) = match word.as_str() {
                "pasado mañana" | "day after tomorrow" => (2, noon),
                // "por la mañana" / "de la mañana" mean "in the morning".
                "mañana" if preceded_by_article(text, whole.start()) => return None,
                "mañana" | "tomorrow" => (1, noon),
                "tonight" | "esta noche" => (0, time_of(EVENING_TIME)),
                _ => (0, noon),
            };
            Some(day(today.checked_add_days(chrono::Days::new(offset))?, default_time))
        });

        push_first(&self.weekday, &|caps| {
            let target = weekday_from_name(caps.get(1)?.as_str())?;
            let current = i64::from(today.weekday().num_days_from_monday());
            let wanted = i64::from(target.num_days_from_monday());
            let delta = match (wanted - current + 7) % 7 {
                0 => 7,
                other => other,
            };
            Some(day(today + Duration::days(delta), noon))
        });

        push_first(&self.span, &|caps| {
            let count = count_from_word(caps.get(1)?.as_str())?;
            let unit = caps.get(2)?.as_str().to_lowercase();
            if unit.starts_with("min") {
                Some(DateValue::Instant(now + Duration::minutes(count)))
            } else if unit.starts_with('h') {
                Some(DateValue::Instant(now + Duration::hours(count)))
            } else if unit.starts_with('d') {
                Some(day(today + Duration::days(count), now.time()))
            } else {
                Some(day(today + Duration::weeks(count), now.time()))
            }
        });

        found
    }

    fn first_clock(&self, text: &str) -> Option<ClockMatch> {
        self.clock.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let has_prefix = caps.name("prefix").is_some();
            let minute = caps.name("minute");
            let meridiem = caps.name("meridiem");
            if !has_prefix && minute.is_none() && meridiem.is_none() {
                return None;
            }

            let mut hour: u32 = caps.name("hour")?.as_str().parse().ok()?;
            let mut next_day = false;
            let minute: u32 = match minute {
                Some(value) => value.as_str().parse().ok()?,
                None => 0,
            };

            if let Some(meridiem) = meridiem {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                let is_pm = meridiem.as_str().to_ascii_lowercase().starts_with('p');
                hour = match (is_pm, hour) {
                    (true, 12) => 12,
                    (true, h) => h + 12,
                    (false, 12) => 0,
                    (false, h) => h,
                };
            } else if let Some(period) = caps.name("period") {
                let period = period.as_str().to_lowercase();
                let evening = period.ends_with("tarde") || period.ends_with("noche");
                if period.ends_with("noche") && hour == 12 {
                    hour = 0;
                    next_day = true;
                } else if evening && hour < 12 {
                    hour += 12;
                }
            }

            let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
            Some(ClockMatch {
                start: whole.start(),
                end: whole.end(),
                time,
                next_day,
            })
        })
    }
}

impl DateDetector for PatternDateDetector {
    fn detect(&self, text: &str, now: DateTime<Local>) -> Option<DetectedDate> {
        let earliest = self
            .date_candidates(text, now)
            .into_iter()
            .min_by_key(|candidate| (candidate.start, Reverse(candidate.end)));
        let clock = self.first_clock(text);

        match (earliest, clock) {
            (Some(candidate), clock) => match candidate.value {
                DateValue::Instant(at) => Some(DetectedDate {
                    at,
                    span: candidate.start..candidate.end,
                }),
                DateValue::Day { date, default_time } => {
                    let (date, time, span) = match clock {
                        Some(clock) => (
                            if clock.next_day { date.succ_opt()? } else { date },
                            clock.time,
                            candidate.start.min(clock.start)..candidate.end.max(clock.end),
                        ),
                        None => (date, default_time, candidate.start..candidate.end),
                    };
                    Some(DetectedDate {
                        at: calendar::at_time(date, time)?,
                        span,
                    })
                }
            },
            (None, Some(clock)) => {
                let mut date = now.date_naive();
                if clock.next_day {
                    date = date.succ_opt()?;
                }
                let mut at = calendar::at_time(date, clock.time)?;
                if at <= now {
                    at = calendar::at_time(date.succ_opt()?, clock.time)?;
                }
                Some(DetectedDate {
                    at,
                    span: clock.start..clock.end,
                })
            }
            (None, None) => None,
        }
    }
}

fn day(date: NaiveDate, default_time: NaiveTime) -> DateValue {
    DateValue::Day { date, default_time }
}

fn time_of((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn expand_year(value: &str) -> Option<i32> {
    let year: i32 = value.parse().ok()?;
    if value.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

/// Builds a date; a year-less date already behind `today` rolls to next year.
fn resolve_month_day(
    today: NaiveDate,
    month: u32,
    day: u32,
    year: Option<i32>,
) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
            match this_year {
                Some(date) if date >= today => Some(date),
                _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
            }
        }
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "enero" | "january" | "jan" => 1,
        "febrero" | "february" | "feb" => 2,
        "marzo" | "march" | "mar" => 3,
        "abril" | "april" | "apr" => 4,
        "mayo" | "may" => 5,
        "junio" | "june" | "jun" => 6,
        "julio" | "july" | "jul" => 7,
        "agosto" | "august" | "aug" => 8,
        "septiembre" | "setiembre" | "september" | "sept" | "sep" => 9,
        "octubre" | "october" | "oct" => 10,
        "noviembre" | "november" | "nov" => 11,
        "diciembre" | "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.to_lowercase().as_str() {
        "lunes" | "monday" => Weekday::Mon,
        "martes" | "tuesday" => Weekday::Tue,
        "miércoles" | "miercoles" | "wednesday" => Weekday::Wed,
        "jueves" | "thursday" => Weekday::Thu,
        "viernes" | "friday" => Weekday::Fri,
        "sábado" | "sabado" | "saturday" => Weekday::Sat,
        "domingo" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn count_from_word(word: &str) -> Option<i64> {
    let count = match word.to_lowercase().as_str() {
        "un" | "una" | "uno" | "a" | "an" | "one" => 1,
        "dos" | "two" => 2,
        "tres" | "three" => 3,
        "cuatro" | "four" => 4,
        "cinco" | "five" => 5,
        digits => digits.parse().ok()?,
    };
    Some(count)
}

fn collapse_spaces(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn preceded_by_article(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end().to_lowercase();
    before == "la" || before.ends_with(" la")
}
