//! Rendering resolved dates as text to insert into a note.

use chrono::{NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::config::Settings;
use crate::engine::Resolution;
use crate::error::Result;
use crate::range::DateRange;

/// How a resolved expression replaces the selected text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InsertMode {
    /// A wiki link to the day, followed by the time when one was stated.
    #[default]
    Replace,
    /// A markdown link labelled with the selected text.
    Link,
    /// The formatted date alone.
    Clean,
    /// The time of day alone.
    Time,
}

/// A timestamp relative to the current instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stamp {
    /// Date and time.
    Now,
    /// Date only.
    Today,
    /// Time only.
    Time,
}

/// The date, with the time appended when the expression stated one.
///
/// # Errors
///
/// Returns an error if a configured pattern is invalid.
pub fn point(settings: &Settings, resolution: &Resolution) -> Result<String> {
    let date = calendar::format(resolution.date, &settings.format)?;
    if resolution.has_time {
        let time = calendar::format(resolution.date, &settings.time_format)?;
        Ok(format!("{date} {time}"))
    } else {
        Ok(date)
    }
}

/// Text replacing `selected` under `mode`.
///
/// # Errors
///
/// Returns an error if a configured pattern is invalid.
pub fn insert(
    settings: &Settings,
    mode: InsertMode,
    selected: &str,
    resolution: &Resolution,
) -> Result<String> {
    match mode {
        InsertMode::Replace if resolution.has_time => {
            let date = calendar::format(resolution.date, &settings.format)?;
            let time = calendar::format(resolution.date, &settings.time_format)?;
            Ok(format!("[[{date}]] {time}"))
        }
        InsertMode::Replace => Ok(format!("[[{}]]", point(settings, resolution)?)),
        InsertMode::Link => Ok(format!("[{selected}]({})", point(settings, resolution)?)),
        InsertMode::Clean => point(settings, resolution),
        InsertMode::Time => calendar::format(resolution.date, &settings.time_format),
    }
}

/// "start to end", both formatted as dates.
///
/// # Errors
///
/// Returns an error if the date pattern is invalid.
pub fn range(settings: &Settings, days: &DateRange) -> Result<String> {
    let start = calendar::format(days.start.and_time(NaiveTime::MIN), &settings.format)?;
    let end = calendar::format(days.end.and_time(NaiveTime::MIN), &settings.format)?;
    Ok(format!("{start} to {end}"))
}

/// Render `now` as the requested stamp.
///
/// # Errors
///
/// Returns an error if a configured pattern is invalid.
pub fn stamp(settings: &Settings, stamp: Stamp, now: NaiveDateTime) -> Result<String> {
    match stamp {
        Stamp::Now => {
            let pattern = format!("{}{}{}", settings.format, settings.separator, settings.time_format);
            calendar::format(now, &pattern)
        }
        Stamp::Today => calendar::format(now, &settings.format),
        Stamp::Time => calendar::format(now, &settings.time_format),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 23)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn timed() -> Resolution {
        Resolution {
            date: at(15, 0),
            has_time: true,
        }
    }

    fn untimed() -> Resolution {
        Resolution {
            date: at(10, 0),
            has_time: false,
        }
    }

    #[test]
    fn replace_links_the_day() {
        let settings = Settings::default();
        let text = insert(&settings, InsertMode::Replace, "next friday", &untimed()).unwrap();
        assert_eq!(text, "[[2026-10-23]]");
        let text = insert(&settings, InsertMode::Replace, "next friday at 3pm", &timed()).unwrap();
        assert_eq!(text, "[[2026-10-23]] 15:00");
    }

    #[test]
    fn other_modes() {
        let settings = Settings::default();
        let link = insert(&settings, InsertMode::Link, "next friday", &untimed()).unwrap();
        assert_eq!(link, "[next friday](2026-10-23)");
        let clean = insert(&settings, InsertMode::Clean, "next friday at 3pm", &timed()).unwrap();
        assert_eq!(clean, "2026-10-23 15:00");
        let time = insert(&settings, InsertMode::Time, "next friday at 3pm", &timed()).unwrap();
        assert_eq!(time, "15:00");
    }

    #[test]
    fn ranges_and_stamps() {
        let settings = Settings {
            format: "%d/%m".to_string(),
            separator: " @ ".to_string(),
            ..Settings::default()
        };
        let days = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 23).unwrap(),
        );
        assert_eq!(range(&settings, &days).unwrap(), "19/10 to 23/10");
        assert_eq!(stamp(&settings, Stamp::Now, at(8, 5)).unwrap(), "23/10 @ 08:05");
        assert_eq!(stamp(&settings, Stamp::Today, at(8, 5)).unwrap(), "23/10");
        assert_eq!(stamp(&settings, Stamp::Time, at(8, 5)).unwrap(), "08:05");
    }

    #[test]
    fn invalid_patterns_are_errors() {
        let settings = Settings {
            format: "%Q".to_string(),
            ..Settings::default()
        };
        assert!(point(&settings, &untimed()).is_err());
    }
}
