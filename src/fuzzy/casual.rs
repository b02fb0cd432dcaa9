//! A small casual-date grammar compiled from one language's vocabulary.
//!
//! Understands ISO dates, day words with an optional time ("tomorrow at 5pm",
//! "demain 15h"), weekday names with an optional time, offsets with an
//! optional time ("in 2 days at 3pm"), the coming week, month or year
//! ("prochain mois"), bare clock times ("3pm", "15:30", "15h30", "15時30分")
//! and ordinal days of the month ("the 5th", "1er", "5.").

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

use super::{Certainty, Component, FuzzyMatch, FuzzyParser, ParseOptions};
use crate::calendar::{self, set_weekday, weekday_from_index, weekday_on_or_after, Unit};
use crate::error::Result;
use crate::keywords::{alternation, is_unspaced, Immediate, WEEKDAY_KEYS};
use crate::translations::Translations;

const MERIDIEM: &str = r"a\.m\.|p\.m\.|am|pm";

type Found = Option<(NaiveDateTime, Certainty)>;
type Rule = fn(&CasualGrammar, &Captures<'_>, &ParseOptions) -> Found;

/// Casual grammar for a single language.
#[derive(Clone, Debug)]
pub struct CasualGrammar {
    language: String,
    bounded: bool,
    immediate: HashMap<String, Immediate>,
    days: HashMap<String, u32>,
    units: HashMap<String, Unit>,
    iso: Option<Regex>,
    clock: Option<Regex>,
    time: Option<Regex>,
    day_word: Option<Regex>,
    weekday: Option<Regex>,
    offset: Option<Regex>,
    period: Option<Regex>,
    ordinal: Option<Regex>,
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|err| log::warn!("Could not compile casual grammar rule: {err}"))
        .ok()
}

fn calendar_day() -> Certainty {
    Certainty::default()
        .with(Component::Day)
        .with(Component::Month)
        .with(Component::Year)
}

impl CasualGrammar {
    /// Compile the grammar for `lang`.
    #[must_use]
    pub fn new(lang: &str, translations: &dyn Translations) -> Self {
        let words = |key: &str| -> Vec<String> {
            translations
                .synonyms(key, lang)
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect()
        };

        let mut immediate = HashMap::new();
        for (key, meaning) in Immediate::KEYS {
            for word in words(key) {
                immediate.entry(word).or_insert(meaning);
            }
        }
        let mut days = HashMap::new();
        for (index, key) in (0u32..).zip(WEEKDAY_KEYS) {
            for word in words(key) {
                days.insert(word, index);
            }
        }
        let mut units = HashMap::new();
        for (key, unit) in Unit::KEYS {
            for word in words(key) {
                units.entry(word).or_insert(unit);
            }
        }

        let bounded = !immediate
            .keys()
            .chain(days.keys())
            .any(|word| word.chars().any(is_unspaced));
        let gap = if bounded { r"\s+" } else { r"\s*" };

        let hour_suffix = alternation(words("hourSuffix").iter().map(String::as_str));
        let minute_suffix = alternation(words("minuteSuffix").iter().map(String::as_str));
        let at = alternation(words("at").iter().map(String::as_str));

        // Non-capturing time expression embedded in the other rules.
        let mut time_alternatives = vec![
            format!(r"\d{{1,2}}(?:[:.]\d{{2}})?\s*(?:{MERIDIEM})"),
            r"\d{1,2}:\d{2}".to_string(),
        ];
        let mut clock_alternatives = vec![
            format!(r"(?P<h1>\d{{1,2}})(?:[:.](?P<m1>\d{{2}}))?\s*(?P<mer>{MERIDIEM})"),
            r"(?P<h2>\d{1,2}):(?P<m2>\d{2})".to_string(),
        ];
        if let Some(hour_suffix) = &hour_suffix {
            let minute_tail = minute_suffix
                .as_ref()
                .map(|m| format!(r"(?:\s*(?:{m}))?"))
                .unwrap_or_default();
            time_alternatives.push(format!(
                r"\d{{1,2}}\s*(?:{hour_suffix})(?:\s*\d{{2}})?{minute_tail}"
            ));
            clock_alternatives.push(format!(
                r"(?P<h3>\d{{1,2}})\s*(?:{hour_suffix})(?:\s*(?P<m3>\d{{2}}))?{minute_tail}"
            ));
        }
        let time = time_alternatives.join("|");
        let clock = compile(&format!(r"(?i)^(?:{})$", clock_alternatives.join("|")));
        let introducer = at
            .map(|at| format!(r"(?:\s*(?:{at}))?"))
            .unwrap_or_default();

        let named_rule = |names: Option<String>| {
            names.and_then(|names| {
                compile(&format!(
                    r"(?i)(?P<word>{names})(?:{introducer}\s*(?P<time>{time}))?"
                ))
            })
        };

        let day_word = named_rule(alternation(immediate.keys().map(String::as_str)));
        let weekday = named_rule(alternation(days.keys().map(String::as_str)));

        let within = alternation(words("in").iter().map(String::as_str));
        let unit_names = alternation(units.keys().map(String::as_str));
        let offset = within.zip(unit_names).and_then(|(within, unit_names)| {
            compile(&format!(
                r"(?i)(?:{within}){gap}(?P<amount>\d{{1,9}})\s*(?P<unit>{unit_names})(?:{introducer}\s*(?P<time>{time}))?"
            ))
        });

        let next = alternation(words("next").iter().map(String::as_str));
        let period_names = alternation(
            units
                .iter()
                .filter(|(_, unit)| matches!(unit, Unit::Week | Unit::Month | Unit::Year))
                .map(|(word, _)| word.as_str()),
        );
        let period = next.zip(period_names).and_then(|(next, period_names)| {
            compile(&format!(r"(?i)(?:{next}){gap}(?P<unit>{period_names})"))
        });

        let ordinal = alternation(words("ordinalSuffix").iter().map(String::as_str))
            .and_then(|suffix| compile(&format!(r"(?i)(?P<day>\d{{1,2}})(?:{suffix})")));

        Self {
            language: lang.to_string(),
            bounded,
            immediate,
            days,
            units,
            iso: compile(r"(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})"),
            clock,
            time: compile(&format!(r"(?i){time}")),
            day_word,
            weekday,
            offset,
            period,
            ordinal,
        }
    }

    /// Parse a clock expression such as "3pm", "15:30" or "15h30".
    fn clock_time(&self, text: &str) -> Option<NaiveTime> {
        let caps = self.clock.as_ref()?.captures(text.trim())?;
        let group = |names: [&str; 3]| names.iter().find_map(|name| caps.name(name));
        let hour: u32 = group(["h1", "h2", "h3"])?.as_str().parse().ok()?;
        let minute: u32 = match group(["m1", "m2", "m3"]) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let hour = match caps.name("mer").map(|m| m.as_str().to_lowercase()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                match (meridiem.starts_with('p'), hour) {
                    (false, 12) => 0,
                    (true, 12) => 12,
                    (true, h) => h + 12,
                    (false, h) => h,
                }
            }
            None => hour,
        };
        NaiveTime::from_hms_opt(hour, minute, 0)
    }

    /// Whether the span is delimited by non-word characters.
    fn is_bounded(&self, text: &str, start: usize, end: usize) -> bool {
        if !self.bounded {
            return true;
        }
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    }

    /// Attach an optional trailing time to a base instant.
    fn with_time(
        &self,
        caps: &Captures<'_>,
        base: NaiveDateTime,
        certain: Certainty,
    ) -> Found {
        match caps.name("time") {
            Some(time) => {
                let time = self.clock_time(time.as_str())?;
                let certain = certain.with(Component::Hour).with(Component::Minute);
                Some((base.date().and_time(time), certain))
            }
            None => Some((base, certain)),
        }
    }

    fn day_word_match(&self, caps: &Captures<'_>, options: &ParseOptions) -> Found {
        let reference = options.reference;
        let word = caps.name("word")?.as_str().to_lowercase();
        let day = calendar_day();
        let (base, certain) = match self.immediate.get(&word)? {
            Immediate::Now => (reference, day.with(Component::Hour).with(Component::Minute)),
            Immediate::Today => (reference, day),
            Immediate::Tomorrow => (reference + Duration::days(1), day),
            Immediate::Yesterday => (reference - Duration::days(1), day),
        };
        self.with_time(caps, base, certain)
    }

    fn weekday_match(&self, caps: &Captures<'_>, options: &ParseOptions) -> Found {
        let reference = options.reference;
        let index = *self.days.get(&caps.name("word")?.as_str().to_lowercase())?;
        let base = if options.forward {
            let date = weekday_on_or_after(reference.date(), weekday_from_index(index));
            date.and_time(reference.time())
        } else {
            set_weekday(reference, index)
        };
        self.with_time(caps, base, Certainty::default().with(Component::Weekday))
    }

    fn offset_match(&self, caps: &Captures<'_>, options: &ParseOptions) -> Found {
        let amount: i64 = caps.name("amount")?.as_str().parse().ok()?;
        let unit = *self.units.get(&caps.name("unit")?.as_str().to_lowercase())?;
        let base = calendar::add(options.reference, amount, unit)?;
        let certain = if unit.is_clock() {
            calendar_day().with(Component::Hour).with(Component::Minute)
        } else {
            calendar_day()
        };
        self.with_time(caps, base, certain)
    }

    /// One week, month or year past the reference.
    fn period_match(&self, caps: &Captures<'_>, options: &ParseOptions) -> Found {
        let unit = *self.units.get(&caps.name("unit")?.as_str().to_lowercase())?;
        let certain = match unit {
            Unit::Year => Certainty::default().with(Component::Year),
            _ => Certainty::default().with(Component::Year).with(Component::Month),
        };
        Some((calendar::add(options.reference, 1, unit)?, certain))
    }

    fn time_match(&self, text: &str, options: &ParseOptions) -> Found {
        let time = self.clock_time(text)?;
        let mut start = options.reference.date().and_time(time);
        if options.forward && start < options.reference {
            start += Duration::days(1);
        }
        Some((start, Certainty::clock()))
    }

    #[allow(clippy::unused_self)]
    fn ordinal_match(&self, caps: &Captures<'_>, options: &ParseOptions) -> Found {
        let reference = options.reference;
        let day: u32 = caps.name("day")?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(reference.year(), reference.month(), day)?;
        Some((
            date.and_time(reference.time()),
            Certainty::default().with(Component::Day),
        ))
    }

    #[allow(clippy::unused_self)]
    fn iso_match(&self, caps: &Captures<'_>, options: &ParseOptions) -> Found {
        let date = NaiveDate::from_ymd_opt(
            caps.name("y")?.as_str().parse().ok()?,
            caps.name("m")?.as_str().parse().ok()?,
            caps.name("d")?.as_str().parse().ok()?,
        )?;
        Some((date.and_time(options.reference.time()), calendar_day()))
    }
}

impl FuzzyParser for CasualGrammar {
    fn language(&self) -> &str {
        &self.language
    }

    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Vec<FuzzyMatch>> {
        let rules: [(Option<&Regex>, Rule); 6] = [
            (self.iso.as_ref(), Self::iso_match),
            (self.day_word.as_ref(), Self::day_word_match),
            (self.weekday.as_ref(), Self::weekday_match),
            (self.offset.as_ref(), Self::offset_match),
            (self.period.as_ref(), Self::period_match),
            (self.ordinal.as_ref(), Self::ordinal_match),
        ];

        let mut candidates: Vec<(usize, usize, NaiveDateTime, Certainty)> = Vec::new();
        for (regex, extract) in rules {
            let Some(regex) = regex else { continue };
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if !self.is_bounded(text, whole.start(), whole.end()) {
                    continue;
                }
                if let Some((at, certain)) = extract(self, &caps, options) {
                    candidates.push((whole.start(), whole.end(), at, certain));
                }
            }
        }
        if let Some(time) = &self.time {
            for found in time.find_iter(text) {
                if !self.is_bounded(text, found.start(), found.end()) {
                    continue;
                }
                if let Some((at, certain)) = self.time_match(found.as_str(), options) {
                    candidates.push((found.start(), found.end(), at, certain));
                }
            }
        }

        // Leftmost first, longest first at equal offsets, no overlaps.
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then((b.1 - b.0).cmp(&(a.1 - a.0))));
        let mut matches: Vec<FuzzyMatch> = Vec::new();
        let mut cursor = 0;
        for (start, end, at, certain) in candidates {
            if start < cursor {
                continue;
            }
            cursor = end;
            matches.push(FuzzyMatch {
                index: start,
                text: text[start..end].to_string(),
                start: at,
                certain,
            });
        }
        log::trace!("{} casual grammar matched {matches:?}", self.language);
        Ok(matches)
    }
}
