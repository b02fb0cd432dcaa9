//! Application configuration types.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::calendar::WeekStart;
use crate::translations::{TranslationTable, DEFAULT_LANGUAGE};

/// Settings loaded from the configuration file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Languages to understand, most preferred first.
    pub languages: Vec<String>,
    /// First day of the week.
    pub week_start: WeekStart,
    /// strftime pattern for dates.
    pub format: String,
    /// strftime pattern for times of day.
    pub time_format: String,
    /// Text placed between a date and a time.
    pub separator: String,
    /// Extra translation table merged over the bundled one.
    pub translations: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            week_start: WeekStart::default(),
            format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M".to_string(),
            separator: " ".to_string(),
            translations: None,
        }
    }
}

impl Settings {
    /// The bundled translations with any configured overlay merged on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the overlay file cannot be read or decoded.
    pub fn translation_table(&self) -> anyhow::Result<TranslationTable> {
        let mut table = TranslationTable::builtin();
        if let Some(path) = &self.translations {
            log::debug!("Loading extra translations from {}...", path.display());
            let source = fs::read_to_string(path).context("could not read translations file")?;
            table.merge(
                TranslationTable::from_toml_str(&source)
                    .context("could not decode translations file")?,
            );
        }
        Ok(table)
    }

    fn normalize(mut self) -> Self {
        if self.languages.is_empty() {
            log::warn!("Configuration lists no languages, using {DEFAULT_LANGUAGE}...");
            self.languages = vec![DEFAULT_LANGUAGE.to_string()];
        }
        self
    }
}

/// Load configuration from disk.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load(path: &Path) -> anyhow::Result<Settings> {
    log::debug!(
        "Checking if configuration file exists at {}...",
        path.display()
    );
    if !path.exists() {
        log::warn!(
            "Could not find configuration at {}, so creating and using an empty configuration...",
            path.display()
        );
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create path to configuration file")?;
        }
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .context("could not create configuration file")?;
    }

    log::debug!("Loading configuration from {}...", path.display());
    let settings = parse(&fs::read_to_string(path).context("could not read configuration file")?)?;
    log::trace!("Loaded configuration: {settings:#?}");
    Ok(settings)
}

/// Parse configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not a valid configuration.
pub fn parse(source: &str) -> anyhow::Result<Settings> {
    let settings: Settings =
        toml::from_str(source).context("could not deserialize configuration file")?;
    Ok(settings.normalize())
}
