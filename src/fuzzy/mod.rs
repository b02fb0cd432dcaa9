//! Fuzzy fallback grammars, one instance per configured language.
//!
//! A grammar scans free text and reports every date-like span it understands,
//! in text order. The arbitrator only ever looks at the first span of each
//! grammar and compares their lengths.

pub mod casual;
pub mod english;

use chrono::{NaiveDateTime, Weekday};

use crate::error::Result;
use crate::translations::Translations;

pub use casual::CasualGrammar;
pub use english::TwoTimerGrammar;

/// A date/time field a grammar can mark as explicitly stated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    /// Calendar year.
    Year,
    /// Calendar month.
    Month,
    /// Day of month.
    Day,
    /// Day of week.
    Weekday,
    /// Hour of day.
    Hour,
    /// Minute of hour.
    Minute,
}

impl Component {
    fn bit(self) -> u8 {
        match self {
            Component::Year => 1,
            Component::Month => 1 << 1,
            Component::Day => 1 << 2,
            Component::Weekday => 1 << 3,
            Component::Hour => 1 << 4,
            Component::Minute => 1 << 5,
        }
    }
}

/// Which fields of a match came from the text rather than from defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Certainty(u8);

impl Certainty {
    /// Mark `component` as certain.
    #[must_use]
    pub fn with(self, component: Component) -> Self {
        Self(self.0 | component.bit())
    }

    /// Whether `component` is certain.
    #[must_use]
    pub fn is_certain(self, component: Component) -> bool {
        self.0 & component.bit() != 0
    }

    /// Shorthand for a match carrying an explicit time of day.
    #[must_use]
    pub fn clock() -> Self {
        Self::default().with(Component::Hour).with(Component::Minute)
    }
}

/// One span a grammar understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Byte offset of the span in the parsed text.
    pub index: usize,
    /// The matched substring.
    pub text: String,
    /// The resolved start instant.
    pub start: NaiveDateTime,
    /// Fields stated explicitly in the text.
    pub certain: Certainty,
}

impl FuzzyMatch {
    /// Length of the matched substring in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the matched substring is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the text stated `component` explicitly.
    #[must_use]
    pub fn is_certain(&self, component: Component) -> bool {
        self.certain.is_certain(component)
    }
}

/// Options passed to every grammar invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// The instant relative expressions are resolved against.
    pub reference: NaiveDateTime,
    /// Resolve ambiguous expressions into the future.
    pub forward: bool,
    /// First day of the week.
    pub week_start: Weekday,
}

impl ParseOptions {
    /// Options anchored at `reference` without forward bias, weeks starting Sunday.
    #[must_use]
    pub fn at(reference: NaiveDateTime) -> Self {
        Self {
            reference,
            forward: false,
            week_start: Weekday::Sun,
        }
    }
}

/// A fuzzy date grammar for one language.
pub trait FuzzyParser: Send + Sync {
    /// Language code this grammar serves.
    fn language(&self) -> &str;

    /// Every span of `text` the grammar understands, in text order.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar fails internally on this input.
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Vec<FuzzyMatch>>;
}

/// Build the grammar for `lang`, or `None` when nothing supports it.
#[must_use]
pub fn for_language(lang: &str, translations: &dyn Translations) -> Option<Box<dyn FuzzyParser>> {
    if !translations.has_language(lang) {
        return None;
    }
    let casual = CasualGrammar::new(lang, translations);
    if lang == "en" {
        Some(Box::new(TwoTimerGrammar::new(casual)))
    } else {
        Some(Box::new(casual))
    }
}
