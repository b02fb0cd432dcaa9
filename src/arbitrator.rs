//! Fallback arbitration across the per-language fuzzy grammars.
//!
//! When no recognizer claims an input, every configured grammar is asked for
//! its reading and the one that consumed the most text wins. Length of the
//! matched span is the only criterion; ties go to the grammar configured
//! first.

use chrono::{NaiveDateTime, NaiveTime, Weekday};

use crate::calendar::{start_of_next_month, start_of_next_year, Unit};
use crate::fuzzy::{Component, FuzzyMatch, FuzzyParser, ParseOptions};
use crate::range;
use crate::recognizers::RecognizerBank;

/// The pool of fallback grammars, in language order.
#[derive(Default)]
pub struct Arbitrator {
    parsers: Vec<Box<dyn FuzzyParser>>,
}

impl std::fmt::Debug for Arbitrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbitrator")
            .field("languages", &self.languages().collect::<Vec<_>>())
            .finish()
    }
}

impl Arbitrator {
    /// Build a pool from grammars already ordered by language preference.
    #[must_use]
    pub fn new(parsers: Vec<Box<dyn FuzzyParser>>) -> Self {
        Self { parsers }
    }

    /// Language codes of the pooled grammars.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.parsers.iter().map(|parser| parser.language())
    }

    /// Whether the pool has no grammars at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// The first match of every grammar that found one.
    ///
    /// A grammar that fails is logged and left out of this call only.
    pub fn first_matches(&self, text: &str, options: &ParseOptions) -> Vec<FuzzyMatch> {
        self.parsers
            .iter()
            .filter_map(|parser| match parser.parse(text, options) {
                Ok(matches) => matches.into_iter().next(),
                Err(err) => {
                    log::warn!("Excluding {} grammar from arbitration: {err}", parser.language());
                    None
                }
            })
            .collect()
    }

    /// The longest first match across all grammars.
    #[must_use]
    pub fn best_match(&self, text: &str, options: &ParseOptions) -> Option<FuzzyMatch> {
        let mut best: Option<FuzzyMatch> = None;
        for candidate in self.first_matches(text, options) {
            if best.as_ref().map_or(true, |b| candidate.len() > b.len()) {
                best = Some(candidate);
            }
        }
        log::debug!("Longest fallback match for {text:?}: {best:?}");
        best
    }

    /// Whether any grammar states a time of day for `text`.
    #[must_use]
    pub fn mentions_time(&self, text: &str, options: &ParseOptions) -> bool {
        self.first_matches(text, options)
            .iter()
            .any(|m| m.is_certain(Component::Hour) || m.is_certain(Component::Minute))
    }

    /// Resolve `text` that no recognizer claimed.
    ///
    /// Returns `now` when no grammar understands the text at all. "next month"
    /// and "next year" jump to the start of that period and "next week" to
    /// the start of the range the range extractor reports. Anything else is
    /// read with a forward bias and the longest match wins.
    #[must_use]
    pub fn resolve(
        &self,
        text: &str,
        bank: &RecognizerBank,
        week_start: Weekday,
        now: NaiveDateTime,
    ) -> NaiveDateTime {
        let plain = ParseOptions {
            week_start,
            ..ParseOptions::at(now)
        };
        if self.first_matches(text, &plain).is_empty() {
            log::debug!("No grammar understands {text:?}, resolving to now");
            return now;
        }

        let period_start = match bank.next_period(text) {
            Some(Unit::Month) => start_of_next_month(now),
            Some(Unit::Year) => start_of_next_year(now),
            Some(Unit::Week) => range::extract(bank, text, week_start, now)
                .map(|range| range.start.and_time(NaiveTime::MIN)),
            _ => None,
        };
        if let Some(start) = period_start {
            log::debug!("Resolved period expression {text:?} to {start}");
            return start;
        }

        let forward = ParseOptions {
            forward: true,
            ..plain
        };
        self.best_match(text, &forward).map_or(now, |m| m.start)
    }
}
