//! Resolve command handler.

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use super::OutputFormat;
use crate::context::AppContext;
use crate::format::{self, InsertMode};

/// A resolved expression as reported to integrations.
#[derive(Clone, Debug, Serialize)]
pub struct Resolved {
    /// The expression as given.
    pub text: String,
    /// The resolved instant.
    pub date: NaiveDateTime,
    /// Whether the expression stated a time of day.
    pub has_time: bool,
    /// The text to insert in place of the expression.
    pub insert: String,
}

impl Resolved {
    /// Resolve `text` and render it under `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured format pattern is invalid.
    pub fn new(ctx: &AppContext, text: &str, mode: InsertMode) -> Result<Self> {
        let resolution = ctx.resolve(text);
        let insert = format::insert(&ctx.settings, mode, text, &resolution)
            .context("could not format resolved date")?;
        Ok(Self {
            text: text.to_string(),
            date: resolution.date,
            has_time: resolution.has_time,
            insert,
        })
    }
}

/// Run the resolve command.
///
/// # Errors
///
/// Returns an error if formatting or terminal I/O fails.
pub fn run(ctx: &AppContext, text: &str, mode: InsertMode, output: OutputFormat) -> Result<()> {
    log::info!("Resolving {text:?} in {mode:?} mode...");
    let resolved = Resolved::new(ctx, text, mode)?;
    match output {
        OutputFormat::Text => ctx.term.write_line(&resolved.insert)?,
        OutputFormat::Json => ctx.term.write_line(
            &serde_json::to_string(&resolved).context("failed to serialize resolution")?,
        )?,
    }
    Ok(())
}
