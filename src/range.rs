//! Date ranges: "from monday to friday" and "next week".

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::calendar::{days_inclusive, next_weekday_after, set_weekday, Unit};
use crate::recognizers::{RecognizerBank, RecognizerKind, Recognized};

/// An inclusive span of calendar days.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Every day from `start` to `end`, ascending.
    pub days: Vec<NaiveDate>,
}

impl DateRange {
    /// The range from `start` to `end` inclusive.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            days: days_inclusive(start, end),
        }
    }
}

/// The range between two Sunday-based weekday indices.
///
/// The start is this week's `from`, moved a week ahead when that day is
/// already behind us. The end is this week's `to`, moved a week ahead when it
/// lands before the start.
#[must_use]
pub fn weekday_range(from: u32, to: u32, now: NaiveDateTime) -> DateRange {
    let today = now.date();
    let week = Duration::weeks(1);

    let mut start = set_weekday(now, from).date();
    if start < today {
        start += week;
    }
    let mut end = set_weekday(now, to).date();
    if end < start {
        end += week;
    }
    if end < start {
        end = set_weekday(start.and_time(now.time()) + week, to).date();
    }
    DateRange::new(start, end)
}

/// The seven days starting at the next `week_start` after `today`.
#[must_use]
pub fn next_week(week_start: Weekday, today: NaiveDate) -> DateRange {
    let start = next_weekday_after(today, week_start);
    DateRange::new(start, start + Duration::days(6))
}

/// Extract a range from normalized `text`, or `None` when it names no range.
#[must_use]
pub fn extract(
    bank: &RecognizerBank,
    text: &str,
    week_start: Weekday,
    now: NaiveDateTime,
) -> Option<DateRange> {
    if let Some(Recognized::WeekdayRange { from, to }) =
        bank.recognize_as(RecognizerKind::WeekdayRange, text)
    {
        log::debug!("Recognized weekday range {from}..={to} in {text:?}");
        return Some(weekday_range(from, to, now));
    }
    if bank.next_period(text) == Some(Unit::Week) {
        log::debug!("Recognized next week in {text:?}");
        return Some(next_week(week_start, now.date()));
    }
    None
}
