//! English grammar: the casual rules first, then `two_timer` for whole phrases.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use chrono::Duration;

use super::{CasualGrammar, Certainty, Component, FuzzyMatch, FuzzyParser, ParseOptions};
use crate::error::{Error, Result};

thread_local! {
    static RECOVERING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, turning a panic into `Err` without reporting it.
///
/// The first call wraps whatever panic hook is installed at that point (the
/// binary's crash reporter) so that it stays silent for panics raised inside
/// `f` on the calling thread. A hook installed later replaces the wrapper.
fn recover_quietly<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    QUIET_HOOK.call_once(|| {
        let report = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !RECOVERING.with(Cell::get) {
                report(info);
            }
        }));
    });
    RECOVERING.with(|flag| flag.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    RECOVERING.with(|flag| flag.set(false));
    result
}

/// English grammar layering `two_timer` over the casual rules.
///
/// `two_timer` only understands a phrase as a whole, so it is consulted when
/// the casual rules did not already cover the entire input. Its match, when it
/// has one, comes first.
#[derive(Clone, Debug)]
pub struct TwoTimerGrammar {
    casual: CasualGrammar,
}

impl TwoTimerGrammar {
    /// Wrap the casual English grammar.
    #[must_use]
    pub fn new(casual: CasualGrammar) -> Self {
        Self { casual }
    }

    fn whole_phrase(&self, text: &str, options: &ParseOptions) -> Result<Option<FuzzyMatch>> {
        let phrase = text.trim();
        if phrase.is_empty() {
            return Ok(None);
        }
        let config = two_timer::Config::new()
            .now(options.reference)
            .default_to_past(!options.forward)
            .monday_starts_week(options.week_start == chrono::Weekday::Mon);

        let parsed = recover_quietly(|| two_timer::parse(phrase, Some(config)))
            .map_err(|_| Error::Parser {
                language: self.language().to_string(),
                message: format!("two_timer panicked on {phrase:?}"),
            })?;

        match parsed {
            Ok((start, end, _)) => {
                let width = end - start;
                let mut certain = Certainty::default();
                if width <= Duration::days(1) {
                    certain = certain
                        .with(Component::Year)
                        .with(Component::Month)
                        .with(Component::Day);
                }
                if width <= Duration::hours(1) {
                    certain = certain.with(Component::Hour);
                }
                if width <= Duration::minutes(1) {
                    certain = certain.with(Component::Minute);
                }
                Ok(Some(FuzzyMatch {
                    index: text.len() - text.trim_start().len(),
                    text: phrase.to_string(),
                    start,
                    certain,
                }))
            }
            Err(err) => {
                log::trace!("two_timer did not understand {phrase:?}: {err:?}");
                Ok(None)
            }
        }
    }
}

impl FuzzyParser for TwoTimerGrammar {
    fn language(&self) -> &str {
        self.casual.language()
    }

    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Vec<FuzzyMatch>> {
        let mut matches = self.casual.parse(text, options)?;
        let phrase_len = text.trim().chars().count();
        if matches.iter().any(|m| m.len() == phrase_len) {
            return Ok(matches);
        }
        if let Some(whole) = self.whole_phrase(text, options)? {
            matches.insert(0, whole);
        }
        Ok(matches)
    }
}
