//! Now/today/time command handler.

use anyhow::{Context as _, Result};

use crate::context::AppContext;
use crate::format::{self, Stamp};

/// Print the current instant as `stamp`.
///
/// # Errors
///
/// Returns an error if a format pattern is invalid or terminal I/O fails.
pub fn run(ctx: &AppContext, stamp: Stamp) -> Result<()> {
    let text = format::stamp(&ctx.settings, stamp, ctx.now).context("could not format timestamp")?;
    ctx.term.write_line(&text)?;
    Ok(())
}
