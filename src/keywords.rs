//! Compiles per-language vocabulary into lookup tables and regex alternations.
//!
//! Compilation is a pure function of the language list and a translation
//! snapshot; it runs once per engine.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::calendar::Unit;
use crate::translations::Translations;

/// Grammar keys for weekday names, indexed Sunday = 0.
pub const WEEKDAY_KEYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// English names and abbreviations seeding the day-name table.
const BASE_DAY_NAMES: &[(&str, u32)] = &[
    ("sunday", 0),
    ("sun", 0),
    ("monday", 1),
    ("mon", 1),
    ("tuesday", 2),
    ("tue", 2),
    ("tues", 2),
    ("wednesday", 3),
    ("wed", 3),
    ("thursday", 4),
    ("thu", 4),
    ("thur", 4),
    ("thurs", 4),
    ("friday", 5),
    ("fri", 5),
    ("saturday", 6),
    ("sat", 6),
];

/// A word meaning a point relative to the current day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Immediate {
    /// The current instant.
    Now,
    /// Today.
    Today,
    /// One day ahead.
    Tomorrow,
    /// One day back.
    Yesterday,
}

impl Immediate {
    /// Grammar keys in lookup precedence order.
    pub const KEYS: [(&'static str, Immediate); 4] = [
        ("now", Immediate::Now),
        ("today", Immediate::Today),
        ("tomorrow", Immediate::Tomorrow),
        ("yesterday", Immediate::Yesterday),
    ];
}

/// Which week a weekday expression refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefix {
    /// The current week.
    This,
    /// The following week.
    Next,
    /// The preceding week.
    Last,
}

/// Prefix words grouped by intent.
#[derive(Clone, Debug, Default)]
pub struct PrefixKeywords {
    /// Words meaning "this".
    pub this: HashSet<String>,
    /// Words meaning "next".
    pub next: HashSet<String>,
    /// Words meaning "last".
    pub last: HashSet<String>,
}

impl PrefixKeywords {
    /// Classify a normalized prefix word, checking this, next, then last.
    #[must_use]
    pub fn classify(&self, word: &str) -> Option<Prefix> {
        if self.this.contains(word) {
            Some(Prefix::This)
        } else if self.next.contains(word) {
            Some(Prefix::Next)
        } else if self.last.contains(word) {
            Some(Prefix::Last)
        } else {
            None
        }
    }
}

/// Escaped regex alternations, `None` when no configured language has the words.
#[derive(Clone, Debug, Default)]
pub struct Patterns {
    /// Relative offset introducers ("in").
    pub within: Option<String>,
    /// this/next/last prefix words, each with the whitespace it needs before
    /// the word it qualifies.
    pub prefix: Option<String>,
    /// "next" words only.
    pub next: Option<String>,
    /// Weekday names.
    pub weekday: Option<String>,
    /// Duration unit names.
    pub unit: Option<String>,
    /// Conjunctions ("and").
    pub and: Option<String>,
    /// Time introducers ("at").
    pub at: Option<String>,
    /// Range openers ("from").
    pub from: Option<String>,
    /// Range closers ("to").
    pub to: Option<String>,
}

/// Everything the recognizers need, derived from the language set.
#[derive(Clone, Debug, Default)]
pub struct CompiledTables {
    /// Immediate words mapped to their meaning.
    pub immediate: HashMap<String, Immediate>,
    /// this/next/last words.
    pub prefixes: PrefixKeywords,
    /// Duration words mapped to their canonical unit.
    pub units: HashMap<String, Unit>,
    /// Day names mapped to a Sunday-based index.
    pub days: HashMap<String, u32>,
    /// Regex alternations.
    pub patterns: Patterns,
}

impl CompiledTables {
    /// Canonical unit for a duration token.
    ///
    /// Tokens missing from the compiled map fall back to abbreviation prefixes,
    /// checked in order: hour, day, week, minute, month, year. Anything else is
    /// minutes.
    #[must_use]
    pub fn resolve_unit(&self, token: &str) -> Unit {
        if let Some(unit) = self.units.get(token) {
            return *unit;
        }
        if token.starts_with('h') {
            Unit::Hour
        } else if token.starts_with('d') || token.starts_with('j') {
            Unit::Day
        } else if token.starts_with('w') || token.starts_with('s') {
            Unit::Week
        } else if token == "m" || token.starts_with("min") {
            Unit::Minute
        } else if token.starts_with("mo") || token == "M" {
            Unit::Month
        } else if token.starts_with('y') || token.starts_with('a') {
            Unit::Year
        } else {
            Unit::Minute
        }
    }

    /// Sunday-based index for a day name, defaulting to Sunday when unknown.
    #[must_use]
    pub fn day_index(&self, name: &str) -> u32 {
        self.days.get(name).copied().unwrap_or(0)
    }
}

/// Build an alternation from words: deduplicated, escaped, longest first.
///
/// Longest-first ordering keeps a short synonym ("min") from shadowing a
/// longer one ("minutes") under leftmost-first alternation.
#[must_use]
pub fn alternation<'a>(words: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let unique: BTreeSet<&str> = words.into_iter().filter(|w| !w.is_empty()).collect();
    if unique.is_empty() {
        return None;
    }
    let mut sorted: Vec<&str> = unique.into_iter().collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    Some(
        sorted
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Whether `c` belongs to a script written without spaces between words.
#[must_use]
pub fn is_unspaced(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{30ff}' | '\u{3400}'..='\u{4dbf}' | '\u{4e00}'..='\u{9fff}')
}

/// Like [`alternation`], with each word followed by its gap: whitespace after
/// spaced words, optional whitespace after words ending in an unspaced script
/// ("来週の金曜日").
#[must_use]
pub fn alternation_with_gap<'a>(words: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let (unspaced, spaced): (Vec<&str>, Vec<&str>) = words
        .into_iter()
        .partition(|word| word.chars().next_back().is_some_and(is_unspaced));
    let parts: Vec<String> = [
        alternation(spaced).map(|words| format!(r"(?:{words})\s+")),
        alternation(unspaced).map(|words| format!(r"(?:{words})\s*")),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!parts.is_empty()).then(|| parts.join("|"))
}

fn collect(translations: &dyn Translations, languages: &[String], key: &str) -> Vec<String> {
    languages
        .iter()
        .flat_map(|lang| translations.synonyms(key, lang))
        .map(|w| w.to_lowercase())
        .collect()
}

/// Compile keyword tables for `languages`.
///
/// Keys a language lacks are skipped silently.
#[must_use]
pub fn compile(languages: &[String], translations: &dyn Translations) -> CompiledTables {
    let mut tables = CompiledTables::default();

    for (key, meaning) in Immediate::KEYS {
        for word in collect(translations, languages, key) {
            tables.immediate.entry(word).or_insert(meaning);
        }
    }

    let this_words = collect(translations, languages, "this");
    let next_words = collect(translations, languages, "next");
    let last_words = collect(translations, languages, "last");
    tables.prefixes = PrefixKeywords {
        this: this_words.iter().cloned().collect(),
        next: next_words.iter().cloned().collect(),
        last: last_words.iter().cloned().collect(),
    };

    let mut unit_words = Vec::new();
    for lang in languages {
        for (key, unit) in Unit::KEYS {
            for word in translations.synonyms(key, lang) {
                let word = word.to_lowercase();
                tables.units.insert(word.clone(), unit);
                unit_words.push(word);
            }
        }
    }

    tables.days = BASE_DAY_NAMES
        .iter()
        .map(|(name, index)| ((*name).to_string(), *index))
        .collect();
    let mut day_words = Vec::new();
    for (index, key) in (0u32..).zip(WEEKDAY_KEYS) {
        for word in collect(translations, languages, key) {
            tables.days.insert(word.clone(), index);
            day_words.push(word);
        }
    }

    let words = |key| collect(translations, languages, key);
    tables.patterns = Patterns {
        within: alternation(words("in").iter().map(String::as_str)),
        prefix: alternation_with_gap(
            this_words
                .iter()
                .chain(&next_words)
                .chain(&last_words)
                .map(String::as_str),
        ),
        next: alternation(next_words.iter().map(String::as_str)),
        weekday: alternation(day_words.iter().map(String::as_str)),
        unit: alternation(unit_words.iter().map(String::as_str)),
        and: alternation(words("and").iter().map(String::as_str)),
        at: alternation(words("at").iter().map(String::as_str)),
        from: alternation(words("from").iter().map(String::as_str)),
        to: alternation(words("to").iter().map(String::as_str)),
    };

    log::trace!("Compiled keyword tables for {languages:?}: {tables:#?}");
    tables
}
