//! Calendar arithmetic on local naive date-times.

use std::fmt::Write as _;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical duration unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Minutes.
    Minute,
    /// Hours.
    Hour,
    /// Days.
    Day,
    /// Weeks.
    Week,
    /// Calendar months.
    Month,
    /// Calendar years.
    Year,
}

impl Unit {
    /// Grammar key for each unit, in declaration order.
    pub const KEYS: [(&'static str, Unit); 6] = [
        ("minute", Unit::Minute),
        ("hour", Unit::Hour),
        ("day", Unit::Day),
        ("week", Unit::Week),
        ("month", Unit::Month),
        ("year", Unit::Year),
    ];

    /// Whether a duration in this unit carries a time-of-day.
    #[must_use]
    pub fn is_clock(self) -> bool {
        matches!(self, Unit::Minute | Unit::Hour)
    }
}

/// Preferred first day of the week.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WeekStart {
    /// Derived from the primary configured language.
    #[default]
    LocaleDefault,
    /// Sunday.
    Sunday,
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
}

impl WeekStart {
    /// Resolve to a concrete weekday, using `primary_language` for the locale default.
    #[must_use]
    pub fn resolve(self, primary_language: &str) -> Weekday {
        match self {
            WeekStart::LocaleDefault => match primary_language {
                "en" | "ja" => Weekday::Sun,
                _ => Weekday::Mon,
            },
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Tuesday => Weekday::Tue,
            WeekStart::Wednesday => Weekday::Wed,
            WeekStart::Thursday => Weekday::Thu,
            WeekStart::Friday => Weekday::Fri,
            WeekStart::Saturday => Weekday::Sat,
        }
    }
}

/// Add `n` units to `dt`, clamping to the end of the month for month/year steps.
///
/// Returns `None` on overflow.
#[must_use]
pub fn add(dt: NaiveDateTime, n: i64, unit: Unit) -> Option<NaiveDateTime> {
    match unit {
        Unit::Minute => dt.checked_add_signed(Duration::try_minutes(n)?),
        Unit::Hour => dt.checked_add_signed(Duration::try_hours(n)?),
        Unit::Day => dt.checked_add_signed(Duration::try_days(n)?),
        Unit::Week => dt.checked_add_signed(Duration::try_weeks(n)?),
        Unit::Month => add_months(dt, n),
        Unit::Year => add_months(dt, n.checked_mul(12)?),
    }
}

fn add_months(dt: NaiveDateTime, n: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        dt.checked_add_months(months)
    } else {
        dt.checked_sub_months(months)
    }
}

/// Weekday for a Sunday-based index (0 = Sunday … 6 = Saturday).
#[must_use]
pub fn weekday_from_index(index: u32) -> Weekday {
    match index % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Move `dt` to weekday `index` (0 = Sunday) within its Sunday-based week.
///
/// The time of day is kept. Moving to Sunday from a Saturday goes back six days.
#[must_use]
pub fn set_weekday(dt: NaiveDateTime, index: u32) -> NaiveDateTime {
    let current = i64::from(dt.weekday().num_days_from_sunday());
    let target = i64::from(index % 7);
    dt + Duration::days(target - current)
}

/// The first `weekday` strictly after `date`.
#[must_use]
pub fn next_weekday_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = i64::from(date.weekday().num_days_from_sunday());
    let target = i64::from(weekday.num_days_from_sunday());
    let ahead = (target - current).rem_euclid(7);
    date + Duration::days(if ahead == 0 { 7 } else { ahead })
}

/// The first `weekday` on or after `date`.
#[must_use]
pub fn weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = i64::from(date.weekday().num_days_from_sunday());
    let target = i64::from(weekday.num_days_from_sunday());
    date + Duration::days((target - current).rem_euclid(7))
}

/// Midnight on the first day of the month after `dt`.
#[must_use]
pub fn start_of_next_month(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    let first = NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)?;
    Some(first.checked_add_months(Months::new(1))?.and_time(NaiveTime::MIN))
}

/// Midnight on January 1 of the year after `dt`.
#[must_use]
pub fn start_of_next_year(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    Some(NaiveDate::from_ymd_opt(dt.year() + 1, 1, 1)?.and_time(NaiveTime::MIN))
}

/// Every calendar day from `start` to `end` inclusive, ascending.
///
/// Empty when `end` is before `start`.
#[must_use]
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .collect()
}

/// Format `dt` with a strftime pattern.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the pattern contains an invalid specifier.
pub fn format(dt: NaiveDateTime, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(pattern)).map_err(|_| Error::InvalidFormat(pattern.to_string()))?;
    Ok(out)
}
