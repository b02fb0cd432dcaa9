//! Per-language vocabulary used to compile recognizers and casual grammars.
//!
//! Values are `|`-separated synonym lists (`next = "next|coming"`). A key
//! missing for a language means that language simply lacks the feature.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Language used when a configured language set is empty.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Bundled tables, one TOML document per language.
const BUILTIN: &[(&str, &str)] = &[
    ("en", include_str!("lang/en.toml")),
    ("fr", include_str!("lang/fr.toml")),
    ("de", include_str!("lang/de.toml")),
    ("pt", include_str!("lang/pt.toml")),
    ("nl", include_str!("lang/nl.toml")),
    ("ja", include_str!("lang/ja.toml")),
];

/// Read access to translated vocabulary.
pub trait Translations {
    /// Look up `key` for `lang`, returning `None` when the language lacks it.
    fn lookup(&self, key: &str, lang: &str) -> Option<&str>;

    /// Whether any vocabulary exists for `lang`.
    fn has_language(&self, lang: &str) -> bool;

    /// Look up `key` for `lang` and split it into trimmed, non-empty synonyms.
    fn synonyms(&self, key: &str, lang: &str) -> Vec<String> {
        self.lookup(key, lang).map(split_synonyms).unwrap_or_default()
    }
}

/// Split a `|`-separated value into trimmed, non-empty alternatives.
#[must_use]
pub fn split_synonyms(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Vocabulary keyed by language code, then by grammar key.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TranslationTable {
    languages: BTreeMap<String, BTreeMap<String, String>>,
}

impl TranslationTable {
    /// The tables shipped with the crate.
    ///
    /// A bundled table that fails to decode is logged and skipped, leaving
    /// that language unsupported.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (lang, source) in BUILTIN {
            match toml::from_str::<BTreeMap<String, String>>(source) {
                Ok(entries) => {
                    log::trace!("Loaded {} bundled entries for {lang}", entries.len());
                    table.languages.insert((*lang).to_string(), entries);
                }
                Err(err) => log::warn!("Could not decode bundled {lang} translations: {err}"),
            }
        }
        table
    }

    /// Parse a table of the form `[fr]\nnext = "prochain|prochaine"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML of that shape.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Overlay `other` on top of this table; entries in `other` win.
    pub fn merge(&mut self, other: TranslationTable) {
        for (lang, entries) in other.languages {
            self.languages.entry(lang).or_default().extend(entries);
        }
    }

    /// Set a single entry.
    pub fn insert(&mut self, lang: &str, key: &str, value: &str) {
        self.languages
            .entry(lang.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }
}

impl Translations for TranslationTable {
    fn lookup(&self, key: &str, lang: &str) -> Option<&str> {
        self.languages
            .get(lang)?
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    fn has_language(&self, lang: &str) -> bool {
        self.languages.contains_key(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_every_bundled_language() {
        let table = TranslationTable::builtin();
        for (lang, _) in BUILTIN {
            assert!(table.has_language(lang), "missing {lang}");
        }
        assert_eq!(table.lookup("tomorrow", "fr"), Some("demain"));
    }

    #[test]
    fn missing_key_is_not_found() {
        let table = TranslationTable::builtin();
        assert_eq!(table.lookup("in", "ja"), None);
        assert_eq!(table.lookup("next", "xx"), None);
    }

    #[test]
    fn splits_synonyms_and_drops_blanks() {
        assert_eq!(
            split_synonyms(" next | coming ||"),
            vec!["next".to_string(), "coming".to_string()]
        );
    }

    #[test]
    fn merge_overrides_per_key() {
        let mut table = TranslationTable::builtin();
        let extra = TranslationTable::from_toml_str("[fr]\nnext = \"prochain\"\n[eo]\ntoday = \"hodiaŭ\"\n")
            .unwrap();
        table.merge(extra);
        assert_eq!(table.lookup("next", "fr"), Some("prochain"));
        assert_eq!(table.lookup("tomorrow", "fr"), Some("demain"));
        assert_eq!(table.lookup("today", "eo"), Some("hodiaŭ"));
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(TranslationTable::from_toml_str("[fr\nnext = 1").is_err());
    }
}
