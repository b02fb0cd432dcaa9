//! Command handlers for the CLI.

pub mod has_time;
pub mod range;
pub mod resolve;
pub mod stamp;

/// How command results are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for programmatic use
    Json,
}
