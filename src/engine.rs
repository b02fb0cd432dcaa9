//! The resolution engine and its hot-swappable handle.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Duration, Local, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::arbitrator::Arbitrator;
use crate::calendar::{self, set_weekday, Unit, WeekStart};
use crate::error::Error;
use crate::fuzzy::{self, FuzzyParser, ParseOptions};
use crate::keywords::{self, Immediate, Prefix};
use crate::oracle;
use crate::range::{self, DateRange};
use crate::recognizers::{RecognizerBank, Recognized};
use crate::translations::{TranslationTable, Translations, DEFAULT_LANGUAGE};

/// A point result together with whether the expression stated a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The resolved instant.
    pub date: NaiveDateTime,
    /// Whether the expression carried an explicit time of day.
    pub has_time: bool,
}

/// Resolves natural-language date expressions for a fixed set of languages.
///
/// Everything language-dependent is compiled once here; resolving never
/// mutates the engine, so one instance can serve any number of readers.
#[derive(Debug)]
pub struct Engine {
    languages: Vec<String>,
    bank: RecognizerBank,
    arbitrator: Arbitrator,
}

fn current_instant() -> NaiveDateTime {
    Local::now().naive_local()
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Keep supported languages in order, defaulting an empty list.
fn supported_languages(languages: &[String], translations: &dyn Translations) -> Vec<String> {
    let requested: Vec<String> = if languages.is_empty() {
        log::warn!("No languages configured, falling back to {DEFAULT_LANGUAGE}");
        vec![DEFAULT_LANGUAGE.to_string()]
    } else {
        languages.to_vec()
    };

    let mut supported = Vec::with_capacity(requested.len());
    for lang in requested {
        if !translations.has_language(&lang) {
            log::warn!("Skipping language: {}", Error::UnsupportedLanguage(lang));
        } else if !supported.contains(&lang) {
            supported.push(lang);
        }
    }
    supported
}

impl Engine {
    /// Build an engine for `languages` using the bundled translations.
    #[must_use]
    pub fn new(languages: &[String]) -> Self {
        Self::with_translations(languages, &TranslationTable::builtin())
    }

    /// Build an engine for `languages` from `translations`.
    ///
    /// Languages without translations are logged and skipped; an engine with
    /// none left still resolves every input, to the current instant.
    #[must_use]
    pub fn with_translations(languages: &[String], translations: &dyn Translations) -> Self {
        let supported = supported_languages(languages, translations);
        let parsers = supported
            .iter()
            .filter_map(|lang| fuzzy::for_language(lang, translations))
            .collect();
        Self::assemble(supported, translations, parsers)
    }

    /// Build an engine with caller-supplied fallback grammars.
    ///
    /// `parsers` are consulted in the order given.
    #[must_use]
    pub fn from_parts(
        languages: &[String],
        translations: &dyn Translations,
        parsers: Vec<Box<dyn FuzzyParser>>,
    ) -> Self {
        Self::assemble(supported_languages(languages, translations), translations, parsers)
    }

    fn assemble(
        languages: Vec<String>,
        translations: &dyn Translations,
        parsers: Vec<Box<dyn FuzzyParser>>,
    ) -> Self {
        let bank = RecognizerBank::new(keywords::compile(&languages, translations));
        let arbitrator = Arbitrator::new(parsers);
        log::debug!("Built engine for {languages:?} with {arbitrator:?}");
        Self {
            languages,
            bank,
            arbitrator,
        }
    }

    /// The languages this engine understands, in preference order.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Resolve a week-start preference against the primary language.
    #[must_use]
    pub fn week_start(&self, preference: WeekStart) -> Weekday {
        let primary = self
            .languages
            .first()
            .map_or(DEFAULT_LANGUAGE, String::as_str);
        preference.resolve(primary)
    }

    /// Resolve `text` to a point in time relative to the current instant.
    #[must_use]
    pub fn resolve_date(&self, text: &str, week_start: WeekStart) -> NaiveDateTime {
        self.resolve_date_at(text, week_start, current_instant())
    }

    /// Resolve `text` to a point in time relative to `now`.
    ///
    /// Never fails: an expression nothing understands resolves to `now`.
    #[must_use]
    pub fn resolve_date_at(
        &self,
        text: &str,
        week_start: WeekStart,
        now: NaiveDateTime,
    ) -> NaiveDateTime {
        let text = normalize(text);
        let week_start = self.week_start(week_start);
        let recognized = self.bank.recognize(&text);
        match &recognized {
            Some(found) => log::debug!("{:?} recognizer claimed {text:?}: {found:?}", found.kind()),
            None => log::debug!("No recognizer claimed {text:?}"),
        }

        recognized
            .and_then(|recognized| self.point(&recognized, week_start, now))
            .unwrap_or_else(|| self.arbitrator.resolve(&text, &self.bank, week_start, now))
    }

    /// The instant a recognized expression names, `None` on calendar overflow.
    fn point(
        &self,
        recognized: &Recognized<'_>,
        week_start: Weekday,
        now: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        match *recognized {
            Recognized::Immediate(Immediate::Now | Immediate::Today) => Some(now),
            Recognized::Immediate(Immediate::Tomorrow) => calendar::add(now, 1, Unit::Day),
            Recognized::Immediate(Immediate::Yesterday) => calendar::add(now, -1, Unit::Day),
            Recognized::CombinedOffset(first, second) => {
                let partial = calendar::add(now, first.amount, first.unit)?;
                calendar::add(partial, second.amount, second.unit)
            }
            Recognized::RelativeOffset(offset) => calendar::add(now, offset.amount, offset.unit),
            Recognized::WeekdayRange { from, to } => {
                Some(range::weekday_range(from, to, now).start.and_time(now.time()))
            }
            Recognized::WeekdayAt { prefix, day, rest } => {
                let day = in_week(prefix, day, now);
                let options = ParseOptions {
                    week_start,
                    ..ParseOptions::at(day)
                };
                Some(self.arbitrator.best_match(rest, &options).map_or(day, |m| m.start))
            }
            Recognized::Weekday { prefix, day } => Some(in_week(prefix, day, now)),
        }
    }

    /// Resolve `text` to a range of days relative to the current instant.
    #[must_use]
    pub fn resolve_range(&self, text: &str, week_start: WeekStart) -> Option<DateRange> {
        self.resolve_range_at(text, week_start, current_instant())
    }

    /// Resolve `text` to a range of days relative to `now`.
    ///
    /// `None` means the text names no range; callers fall back to
    /// [`Engine::resolve_date_at`].
    #[must_use]
    pub fn resolve_range_at(
        &self,
        text: &str,
        week_start: WeekStart,
        now: NaiveDateTime,
    ) -> Option<DateRange> {
        range::extract(&self.bank, &normalize(text), self.week_start(week_start), now)
    }

    /// Whether `text` states a time of day.
    #[must_use]
    pub fn has_explicit_time(&self, text: &str) -> bool {
        self.has_explicit_time_at(text, current_instant())
    }

    /// Whether `text` states a time of day, reading relative expressions against `now`.
    #[must_use]
    pub fn has_explicit_time_at(&self, text: &str, now: NaiveDateTime) -> bool {
        let week_start = self.week_start(WeekStart::default());
        oracle::has_time(&self.bank, &self.arbitrator, &normalize(text), week_start, now)
    }

    /// Resolve `text` and report whether it stated a time.
    #[must_use]
    pub fn resolve(&self, text: &str, week_start: WeekStart) -> Resolution {
        self.resolve_at(text, week_start, current_instant())
    }

    /// [`Engine::resolve`] relative to `now`.
    #[must_use]
    pub fn resolve_at(&self, text: &str, week_start: WeekStart, now: NaiveDateTime) -> Resolution {
        Resolution {
            date: self.resolve_date_at(text, week_start, now),
            has_time: self.has_explicit_time_at(text, now),
        }
    }
}

/// The Sunday-based `day` of the week `prefix` names.
fn in_week(prefix: Prefix, day: u32, now: NaiveDateTime) -> NaiveDateTime {
    let anchor = match prefix {
        Prefix::This => now,
        Prefix::Next => now + Duration::weeks(1),
        Prefix::Last => now - Duration::weeks(1),
    };
    set_weekday(anchor, day)
}

/// A shared engine that can be rebuilt and swapped while in use.
///
/// Readers take a snapshot of the current engine; a replacement is built in
/// full before it becomes visible.
#[derive(Debug)]
pub struct SharedEngine {
    current: RwLock<Arc<Engine>>,
}

impl SharedEngine {
    /// Share `engine`.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    /// The engine currently in service.
    #[must_use]
    pub fn current(&self) -> Arc<Engine> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Put `engine` in service, returning the one it replaces.
    pub fn replace(&self, engine: Engine) -> Arc<Engine> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(engine))
    }

    /// Build an engine for a new language set, then put it in service.
    pub fn reload(&self, languages: &[String], translations: &dyn Translations) -> Arc<Engine> {
        log::info!("Reloading engine for {languages:?}");
        self.replace(Engine::with_translations(languages, translations))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, NaiveTime};

    use super::*;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(ToString::to_string).collect()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    /// Friday, 2026-10-16 10:00.
    fn friday() -> NaiveDateTime {
        at(2026, 10, 16, 10, 0)
    }

    fn resolve(engine: &Engine, text: &str) -> NaiveDateTime {
        engine.resolve_date_at(text, WeekStart::default(), friday())
    }

    #[test]
    fn immediate_keywords() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "now"), friday());
        assert_eq!(resolve(&engine, "today"), friday());
        assert_eq!(resolve(&engine, "tomorrow").date(), friday().date() + Duration::days(1));
        assert_eq!(resolve(&engine, "yesterday"), at(2026, 10, 15, 10, 0));
        assert_eq!(resolve(&engine, "  Tomorrow "), at(2026, 10, 17, 10, 0));
    }

    #[test]
    fn today_resolves_to_the_same_day_when_repeated() {
        let engine = Engine::new(&langs(&["en"]));
        let once = resolve(&engine, "today");
        let twice = engine.resolve_date_at("today", WeekStart::default(), once);
        assert_eq!(once.date(), twice.date());
    }

    #[test]
    fn combined_offsets_apply_in_order() {
        let engine = Engine::new(&langs(&["en"]));
        let january = at(2026, 1, 20, 8, 0);
        let resolve = |text| engine.resolve_date_at(text, WeekStart::default(), january);
        assert_eq!(resolve("in 2 weeks and 3 days"), at(2026, 2, 6, 8, 0));

        let end_of_month = at(2026, 1, 30, 8, 0);
        let resolve = |text| engine.resolve_date_at(text, WeekStart::default(), end_of_month);
        assert_eq!(resolve("in 1 month and 1 day"), at(2026, 3, 1, 8, 0));
        assert_eq!(resolve("in 1 day and 1 month"), at(2026, 2, 28, 8, 0));
    }

    #[test]
    fn relative_offsets() {
        let engine = Engine::new(&langs(&["en", "fr"]));
        assert_eq!(resolve(&engine, "in 30 minutes"), at(2026, 10, 16, 10, 30));
        assert_eq!(resolve(&engine, "in 3 mo"), at(2027, 1, 16, 10, 0));
        assert_eq!(resolve(&engine, "dans 3 jours"), at(2026, 10, 19, 10, 0));
    }

    #[test]
    fn prefixed_weekdays() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "next friday"), at(2026, 10, 23, 10, 0));
        assert_eq!(resolve(&engine, "last monday"), at(2026, 10, 5, 10, 0));
        assert_eq!(resolve(&engine, "this sunday"), at(2026, 10, 11, 10, 0));
    }

    #[test]
    fn weekday_with_time() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "next friday at 3pm"), at(2026, 10, 23, 15, 0));
        assert_eq!(resolve(&engine, "next friday at lunch"), at(2026, 10, 23, 10, 0));
    }

    #[test]
    fn weekday_range_resolves_to_its_start() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "from monday to friday"), at(2026, 10, 19, 10, 0));
    }

    #[test]
    fn generic_next_periods() {
        let engine = Engine::new(&langs(&["en"]));
        let midnight = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_time(NaiveTime::MIN)
        };
        assert_eq!(resolve(&engine, "next month"), midnight(2026, 11, 1));
        assert_eq!(resolve(&engine, "next year"), midnight(2027, 1, 1));
        assert_eq!(resolve(&engine, "next week"), midnight(2026, 10, 18));
    }

    #[test]
    fn next_periods_agree_with_ranges_in_other_languages() {
        let midnight = |m, d| {
            NaiveDate::from_ymd_opt(2026, m, d)
                .unwrap()
                .and_time(NaiveTime::MIN)
        };
        let french = Engine::new(&langs(&["fr"]));
        assert_eq!(resolve(&french, "prochain mois"), midnight(11, 1));
        assert_eq!(resolve(&french, "prochaine semaine"), midnight(10, 19));
        let week = french
            .resolve_range_at("prochaine semaine", WeekStart::default(), friday())
            .unwrap();
        assert_eq!(resolve(&french, "prochaine semaine").date(), week.start);

        let german = Engine::new(&langs(&["de"]));
        assert_eq!(resolve(&german, "nächsten monat"), midnight(11, 1));
        assert_eq!(
            resolve(&german, "nächstes jahr"),
            NaiveDate::from_ymd_opt(2027, 1, 1).unwrap().and_time(NaiveTime::MIN)
        );
        assert_eq!(resolve(&german, "nächste woche"), midnight(10, 19));
    }

    #[test]
    fn unspaced_prefixes_reach_the_weekday_recognizer() {
        let engine = Engine::new(&langs(&["ja"]));
        assert_eq!(resolve(&engine, "来週の金曜日"), at(2026, 10, 23, 10, 0));
        assert_eq!(resolve(&engine, "来週の 金曜日"), at(2026, 10, 23, 10, 0));
        assert_eq!(resolve(&engine, "先週の月曜日"), at(2026, 10, 5, 10, 0));
    }

    #[test]
    fn offsets_with_a_time_keep_both() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "in 2 days at 3pm"), at(2026, 10, 18, 15, 0));
        assert!(engine.has_explicit_time_at("in 2 days at 3pm", friday()));
    }

    #[test]
    fn fallback_grammars_handle_the_rest() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "tomorrow at 5pm"), at(2026, 10, 17, 17, 0));
        assert_eq!(
            resolve(&engine, "2027-03-04").date(),
            NaiveDate::from_ymd_opt(2027, 3, 4).unwrap()
        );
    }

    #[test]
    fn total_miss_resolves_to_now() {
        let engine = Engine::new(&langs(&["en"]));
        assert_eq!(resolve(&engine, "quarterly synergy review"), friday());
        assert_eq!(resolve(&engine, ""), friday());
    }

    #[test]
    fn unsupported_languages_are_skipped() {
        let engine = Engine::new(&langs(&["tlh", "en", "en"]));
        assert_eq!(engine.languages(), &langs(&["en"])[..]);
        assert_eq!(resolve(&engine, "tomorrow"), at(2026, 10, 17, 10, 0));

        let nothing = Engine::new(&langs(&["tlh"]));
        assert!(nothing.languages().is_empty());
        assert_eq!(resolve(&nothing, "tomorrow"), friday());
        let range = nothing.resolve_range_at("from monday to friday", WeekStart::default(), friday());
        assert_eq!(range, None);
    }

    #[test]
    fn empty_language_list_uses_the_default() {
        let engine = Engine::new(&[]);
        assert_eq!(engine.languages(), &langs(&[DEFAULT_LANGUAGE])[..]);
    }

    #[test]
    fn ranges() {
        let engine = Engine::new(&langs(&["en"]));
        let range = engine
            .resolve_range_at("From Monday to Friday", WeekStart::default(), friday())
            .unwrap();
        assert_eq!(range.days.len(), 5);
        assert_eq!(range.start.weekday(), Weekday::Mon);
        assert_eq!(range.end.weekday(), Weekday::Fri);
        assert_eq!(engine.resolve_range_at("tomorrow", WeekStart::default(), friday()), None);
    }

    #[test]
    fn locale_default_week_start_follows_the_primary_language() {
        let french = Engine::new(&langs(&["fr", "en"]));
        let range = french
            .resolve_range_at("prochaine semaine", WeekStart::default(), friday())
            .unwrap();
        assert_eq!(range.start.weekday(), Weekday::Mon);

        let english = Engine::new(&langs(&["en"]));
        let range = english
            .resolve_range_at("next week", WeekStart::Wednesday, friday())
            .unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
    }

    #[test]
    fn resolution_pairs_date_and_time_presence() {
        let engine = Engine::new(&langs(&["en"]));
        let timed = engine.resolve_at("next friday at 3pm", WeekStart::default(), friday());
        assert_eq!(timed.date, at(2026, 10, 23, 15, 0));
        assert!(timed.has_time);

        let untimed = engine.resolve_at("next friday", WeekStart::default(), friday());
        assert!(!untimed.has_time);
        assert!(engine.has_explicit_time_at("in 30 minutes", friday()));
    }

    #[test]
    fn custom_parsers_can_be_injected() {
        struct Always;
        impl FuzzyParser for Always {
            fn language(&self) -> &str {
                "en"
            }

            fn parse(
                &self,
                text: &str,
                options: &ParseOptions,
            ) -> crate::error::Result<Vec<fuzzy::FuzzyMatch>> {
                Ok(vec![fuzzy::FuzzyMatch {
                    index: 0,
                    text: text.to_string(),
                    start: options.reference + Duration::days(100),
                    certain: fuzzy::Certainty::default(),
                }])
            }
        }

        let table = TranslationTable::builtin();
        let engine = Engine::from_parts(&langs(&["en"]), &table, vec![Box::new(Always)]);
        assert_eq!(resolve(&engine, "whenever"), friday() + Duration::days(100));
        assert_eq!(resolve(&engine, "tomorrow"), at(2026, 10, 17, 10, 0));
    }

    #[test]
    fn shared_engine_swaps_whole_engines() {
        let shared = SharedEngine::new(Engine::new(&langs(&["en"])));
        let before = shared.current();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                let engine = shared.current();
                assert_eq!(resolve(&engine, "tomorrow"), at(2026, 10, 17, 10, 0));
            });
        });

        let previous = shared.reload(&langs(&["fr"]), &TranslationTable::builtin());
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(shared.current().languages(), &langs(&["fr"])[..]);
        assert_eq!(resolve(&shared.current(), "demain"), at(2026, 10, 17, 10, 0));
        assert_eq!(resolve(&before, "tomorrow"), at(2026, 10, 17, 10, 0));
    }
}
