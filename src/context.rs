//! Application context shared across commands.

use chrono::{Local, NaiveDateTime};
use console::Term;

use crate::config::Settings;
use crate::engine::{Engine, Resolution};
use crate::range::DateRange;

/// Shared application context passed to all commands.
pub struct AppContext {
    /// Application settings.
    pub settings: Settings,
    /// Resolution engine built for the configured languages.
    pub engine: Engine,
    /// Terminal for output.
    pub term: Term,
    /// Current time.
    pub now: NaiveDateTime,
}

impl AppContext {
    /// Create a new application context.
    #[must_use]
    pub fn new(settings: Settings, engine: Engine) -> Self {
        Self::at(settings, engine, Local::now().naive_local())
    }

    /// Create a context frozen at `now`.
    #[must_use]
    pub fn at(settings: Settings, engine: Engine, now: NaiveDateTime) -> Self {
        Self {
            settings,
            engine,
            term: Term::stdout(),
            now,
        }
    }

    /// Resolve `text` as a point with the configured week start.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Resolution {
        self.engine.resolve_at(text, self.settings.week_start, self.now)
    }

    /// Resolve `text` as a range with the configured week start.
    #[must_use]
    pub fn resolve_range(&self, text: &str) -> Option<DateRange> {
        self.engine
            .resolve_range_at(text, self.settings.week_start, self.now)
    }
}
