//! Decides whether an expression states a time of day.

use chrono::{NaiveDateTime, Weekday};

use crate::arbitrator::Arbitrator;
use crate::fuzzy::ParseOptions;
use crate::keywords::Immediate;
use crate::recognizers::{RecognizerBank, Recognized};

/// Whether normalized `text` carries an explicit time of day.
///
/// Reads the input through the same recognizers that resolve it. Offsets in
/// minutes or hours carry a time, offsets in larger units never do. Inputs no
/// recognizer settles are decided by whether any fallback grammar marks an
/// hour or minute as stated.
#[must_use]
pub fn has_time(
    bank: &RecognizerBank,
    arbitrator: &Arbitrator,
    text: &str,
    week_start: Weekday,
    now: NaiveDateTime,
) -> bool {
    let verdict = match bank.recognize(text) {
        Some(Recognized::Immediate(word)) => Some(word == Immediate::Now),
        Some(Recognized::CombinedOffset(first, second)) => {
            Some(first.unit.is_clock() || second.unit.is_clock())
        }
        Some(Recognized::RelativeOffset(offset)) => Some(offset.unit.is_clock()),
        Some(Recognized::WeekdayAt { .. }) => Some(true),
        Some(Recognized::Weekday { .. }) => Some(false),
        Some(Recognized::WeekdayRange { .. }) | None => None,
    };
    verdict.unwrap_or_else(|| {
        let options = ParseOptions {
            week_start,
            ..ParseOptions::at(now)
        };
        arbitrator.mentions_time(text, &options)
    })
}
