//! Error types for the resolution engine and its collaborators.
//!
//! Resolution itself never fails (an unrecognized expression resolves to the
//! current instant); these errors surface at the edges: loading translation
//! data, formatting output, and individual fallback grammars.

/// Errors raised by the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured language has neither translation data nor a grammar.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A fallback grammar failed on a particular input.
    #[error("{language} grammar failed: {message}")]
    Parser {
        /// Language code of the failing grammar instance.
        language: String,
        /// What went wrong.
        message: String,
    },

    /// A translation table could not be decoded.
    #[error("could not decode translation table: {0}")]
    Translations(#[from] toml::de::Error),

    /// A date/time format pattern is not a valid strftime pattern.
    #[error("invalid format pattern: {0:?}")]
    InvalidFormat(String),
}

/// Shorthand result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
