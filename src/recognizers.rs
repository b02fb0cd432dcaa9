//! The fixed-precedence bank of hand-written expression recognizers.
//!
//! Each recognizer is a whole-string regex compiled from [`Patterns`] plus an
//! extractor that turns its captures into a [`Recognized`] value. Turning that
//! value into a date is the engine's job; the time-presence oracle inspects
//! the same values, so both read an input identically.

use regex::{Captures, Regex};

use crate::calendar::Unit;
use crate::keywords::{CompiledTables, Immediate, Patterns, Prefix};

/// Identity of a recognizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecognizerKind {
    /// "today", "tomorrow", "now", …
    Immediate,
    /// "in 2 weeks and 3 days"
    CombinedOffset,
    /// "in 2 weeks"
    RelativeOffset,
    /// "from monday to friday"
    WeekdayRange,
    /// "next friday at 3pm"
    WeekdayAt,
    /// "next friday"
    Weekday,
}

impl RecognizerKind {
    /// Evaluation order; the first match wins.
    pub const PRECEDENCE: [RecognizerKind; 6] = [
        RecognizerKind::Immediate,
        RecognizerKind::CombinedOffset,
        RecognizerKind::RelativeOffset,
        RecognizerKind::WeekdayRange,
        RecognizerKind::WeekdayAt,
        RecognizerKind::Weekday,
    ];
}

/// A signed count of one canonical unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Offset {
    /// How many units.
    pub amount: i64,
    /// Which unit.
    pub unit: Unit,
}

/// What a recognizer extracted from an input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recognized<'t> {
    /// An immediate keyword.
    Immediate(Immediate),
    /// Two offsets, applied first then second.
    CombinedOffset(Offset, Offset),
    /// A single offset.
    RelativeOffset(Offset),
    /// Sunday-based day indices of a weekday range.
    WeekdayRange {
        /// First day.
        from: u32,
        /// Last day.
        to: u32,
    },
    /// A prefixed weekday with a trailing time expression.
    WeekdayAt {
        /// Which week.
        prefix: Prefix,
        /// Sunday-based day index.
        day: u32,
        /// Unparsed time-of-day text.
        rest: &'t str,
    },
    /// A prefixed weekday.
    Weekday {
        /// Which week.
        prefix: Prefix,
        /// Sunday-based day index.
        day: u32,
    },
}

impl Recognized<'_> {
    /// Which recognizer produced this value.
    #[must_use]
    pub fn kind(&self) -> RecognizerKind {
        match self {
            Recognized::Immediate(_) => RecognizerKind::Immediate,
            Recognized::CombinedOffset(..) => RecognizerKind::CombinedOffset,
            Recognized::RelativeOffset(_) => RecognizerKind::RelativeOffset,
            Recognized::WeekdayRange { .. } => RecognizerKind::WeekdayRange,
            Recognized::WeekdayAt { .. } => RecognizerKind::WeekdayAt,
            Recognized::Weekday { .. } => RecognizerKind::Weekday,
        }
    }
}

fn build(name: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::warn!("Could not compile the {name} recognizer, disabling it: {err}");
            None
        }
    }
}

/// Compiled recognizers over one set of keyword tables.
#[derive(Clone, Debug)]
pub struct RecognizerBank {
    tables: CompiledTables,
    combined: Option<Regex>,
    relative: Option<Regex>,
    range: Option<Regex>,
    weekday_at: Option<Regex>,
    weekday: Option<Regex>,
    next_period: Option<Regex>,
}

impl RecognizerBank {
    /// Build every recognizer whose vocabulary is present in `tables`.
    #[must_use]
    pub fn new(tables: CompiledTables) -> Self {
        let Patterns {
            within,
            prefix,
            next,
            weekday,
            unit,
            and,
            at,
            from,
            to,
        } = &tables.patterns;

        let combined = match (within, unit, and) {
            (Some(within), Some(unit), Some(and)) => build(
                "combined offset",
                &format!(
                    r"(?i)^\s*(?:{within})\s+(\d+)\s*({unit})\s+(?:{and})\s+(\d+)\s*({unit})\s*$"
                ),
            ),
            _ => None,
        };
        let relative = match (within, unit) {
            (Some(within), Some(unit)) => build(
                "relative offset",
                &format!(r"(?i)^\s*(?:{within})\s+(\d+)\s*({unit})\s*$"),
            ),
            _ => None,
        };
        let range = match (from, to, weekday) {
            (Some(from), Some(to), Some(weekday)) => build(
                "weekday range",
                &format!(r"(?i)^\s*(?:{from})\s+({weekday})\s+(?:{to})\s+({weekday})\s*$"),
            ),
            _ => None,
        };
        let weekday_at = match (prefix, weekday, at) {
            (Some(prefix), Some(weekday), Some(at)) => build(
                "weekday with time",
                &format!(r"(?i)^\s*({prefix})({weekday})\s+(?:{at})\s+(.+)$"),
            ),
            _ => None,
        };
        let weekday_simple = match (prefix, weekday) {
            (Some(prefix), Some(weekday)) => build(
                "weekday",
                &format!(r"(?i)^\s*({prefix})({weekday})\s*$"),
            ),
            _ => None,
        };
        let next_period = next
            .as_ref()
            .and_then(|next| build("next period", &format!(r"(?i)(?:{next})\s+(\w+)")));

        Self {
            combined,
            relative,
            range,
            weekday_at,
            weekday: weekday_simple,
            next_period,
            tables,
        }
    }

    /// Walk the recognizers in precedence order over normalized `text`.
    ///
    /// A recognizer whose pattern matches but whose extraction fails (an
    /// out-of-range count) yields to the next one.
    #[must_use]
    pub fn recognize<'t>(&self, text: &'t str) -> Option<Recognized<'t>> {
        RecognizerKind::PRECEDENCE
            .into_iter()
            .find_map(|kind| self.recognize_as(kind, text))
    }

    /// Run a single recognizer over normalized `text`.
    #[must_use]
    pub fn recognize_as<'t>(&self, kind: RecognizerKind, text: &'t str) -> Option<Recognized<'t>> {
        match kind {
            RecognizerKind::Immediate => self
                .tables
                .immediate
                .get(text)
                .map(|meaning| Recognized::Immediate(*meaning)),
            RecognizerKind::CombinedOffset => {
                let caps = self.combined.as_ref()?.captures(text)?;
                Some(Recognized::CombinedOffset(
                    self.offset(&caps, 1, 2)?,
                    self.offset(&caps, 3, 4)?,
                ))
            }
            RecognizerKind::RelativeOffset => {
                let caps = self.relative.as_ref()?.captures(text)?;
                Some(Recognized::RelativeOffset(self.offset(&caps, 1, 2)?))
            }
            RecognizerKind::WeekdayRange => {
                let caps = self.range.as_ref()?.captures(text)?;
                Some(Recognized::WeekdayRange {
                    from: self.tables.day_index(&caps[1].to_lowercase()),
                    to: self.tables.day_index(&caps[2].to_lowercase()),
                })
            }
            RecognizerKind::WeekdayAt => {
                let caps = self.weekday_at.as_ref()?.captures(text)?;
                Some(Recognized::WeekdayAt {
                    prefix: self.tables.prefixes.classify(&caps[1].trim_end().to_lowercase())?,
                    day: self.tables.day_index(&caps[2].to_lowercase()),
                    rest: caps.get(3)?.as_str().trim(),
                })
            }
            RecognizerKind::Weekday => {
                let caps = self.weekday.as_ref()?.captures(text)?;
                Some(Recognized::Weekday {
                    prefix: self.tables.prefixes.classify(&caps[1].trim_end().to_lowercase())?,
                    day: self.tables.day_index(&caps[2].to_lowercase()),
                })
            }
        }
    }

    /// The unit named after a "next" word anywhere in `text` ("next month").
    ///
    /// Only week, month and year count as periods.
    #[must_use]
    pub fn next_period(&self, text: &str) -> Option<Unit> {
        let caps = self.next_period.as_ref()?.captures(text)?;
        match self.tables.units.get(&caps[1].to_lowercase()) {
            Some(unit @ (Unit::Week | Unit::Month | Unit::Year)) => Some(*unit),
            _ => None,
        }
    }

    fn offset(&self, caps: &Captures<'_>, amount: usize, unit: usize) -> Option<Offset> {
        let amount = caps.get(amount)?.as_str().parse().ok()?;
        let unit = self.tables.resolve_unit(&caps.get(unit)?.as_str().to_lowercase());
        Some(Offset { amount, unit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::compile;
    use crate::translations::TranslationTable;

    fn bank(codes: &[&str]) -> RecognizerBank {
        let languages: Vec<String> = codes.iter().map(ToString::to_string).collect();
        RecognizerBank::new(compile(&languages, &TranslationTable::builtin()))
    }

    #[test]
    fn recognizes_each_shape() {
        let bank = bank(&["en"]);
        assert_eq!(
            bank.recognize("tomorrow"),
            Some(Recognized::Immediate(Immediate::Tomorrow))
        );
        assert_eq!(
            bank.recognize("in 2 weeks and 3 days"),
            Some(Recognized::CombinedOffset(
                Offset { amount: 2, unit: Unit::Week },
                Offset { amount: 3, unit: Unit::Day },
            ))
        );
        assert_eq!(
            bank.recognize("in 30 minutes"),
            Some(Recognized::RelativeOffset(Offset { amount: 30, unit: Unit::Minute }))
        );
        assert_eq!(
            bank.recognize("from monday to friday"),
            Some(Recognized::WeekdayRange { from: 1, to: 5 })
        );
        assert_eq!(
            bank.recognize("next friday at 3pm"),
            Some(Recognized::WeekdayAt { prefix: Prefix::Next, day: 5, rest: "3pm" })
        );
        assert_eq!(
            bank.recognize("last tue"),
            Some(Recognized::Weekday { prefix: Prefix::Last, day: 2 })
        );
        assert_eq!(bank.recognize("next month"), None);
    }

    #[test]
    fn unit_may_touch_the_number() {
        let bank = bank(&["en"]);
        assert_eq!(
            bank.recognize("in 2h"),
            Some(Recognized::RelativeOffset(Offset { amount: 2, unit: Unit::Hour }))
        );
        assert_eq!(
            bank.recognize("in 3 mo"),
            Some(Recognized::RelativeOffset(Offset { amount: 3, unit: Unit::Month }))
        );
    }

    #[test]
    fn recognizes_mixed_languages() {
        let bank = bank(&["en", "fr"]);
        assert_eq!(
            bank.recognize("dans 2 semaines et 3 jours"),
            Some(Recognized::CombinedOffset(
                Offset { amount: 2, unit: Unit::Week },
                Offset { amount: 3, unit: Unit::Day },
            ))
        );
        assert_eq!(
            bank.recognize("prochain vendredi"),
            Some(Recognized::Weekday { prefix: Prefix::Next, day: 5 })
        );
        assert_eq!(
            bank.recognize("de lundi à vendredi"),
            Some(Recognized::WeekdayRange { from: 1, to: 5 })
        );
    }

    #[test]
    fn languages_without_connectors_have_no_offset_recognizers() {
        let bank = bank(&["ja"]);
        assert_eq!(bank.recognize("in 2 days"), None);
        assert_eq!(
            bank.recognize("明日"),
            Some(Recognized::Immediate(Immediate::Tomorrow))
        );
    }

    #[test]
    fn unspaced_prefixes_may_touch_the_day_name() {
        let bank = bank(&["ja", "en"]);
        let found = bank.recognize("来週の金曜日").unwrap();
        assert_eq!(found, Recognized::Weekday { prefix: Prefix::Next, day: 5 });
        assert_eq!(found.kind(), RecognizerKind::Weekday);
        assert_eq!(
            bank.recognize("次の 月曜"),
            Some(Recognized::Weekday { prefix: Prefix::Next, day: 1 })
        );
        assert_eq!(bank.recognize("nextfriday"), None);
    }

    #[test]
    fn oversized_counts_fall_through() {
        let bank = bank(&["en"]);
        assert_eq!(bank.recognize("in 99999999999999999999 days"), None);
    }

    #[test]
    fn metacharacters_in_vocabulary_match_literally() {
        let mut table = TranslationTable::default();
        table.insert("xx", "next", "n.xt|(next)");
        table.insert("xx", "friday", "fri+");
        let bank = RecognizerBank::new(compile(&["xx".to_string()], &table));
        assert_eq!(
            bank.recognize("n.xt fri+"),
            Some(Recognized::Weekday { prefix: Prefix::Next, day: 5 })
        );
        assert_eq!(
            bank.recognize("(next) fri+"),
            Some(Recognized::Weekday { prefix: Prefix::Next, day: 5 })
        );
        assert_eq!(bank.recognize("nxxt fri+"), None);
        assert_eq!(bank.recognize("n.xt friii"), None);
    }

    #[test]
    fn finds_next_periods() {
        let bank = bank(&["en", "fr"]);
        assert_eq!(bank.next_period("next month"), Some(Unit::Month));
        assert_eq!(bank.next_period("prochain mois"), Some(Unit::Month));
        assert_eq!(bank.next_period("see you next year"), Some(Unit::Year));
        assert_eq!(bank.next_period("next week"), Some(Unit::Week));
        assert_eq!(bank.next_period("next hour"), None);
        assert_eq!(bank.next_period("tomorrow"), None);
    }
}
