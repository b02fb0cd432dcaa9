//! Has-time command handler.

use anyhow::Result;

use crate::context::AppContext;

/// Run the has-time command, printing `true` or `false`.
///
/// # Errors
///
/// Returns an error if terminal I/O fails.
pub fn run(ctx: &AppContext, text: &str) -> Result<()> {
    let has_time = ctx.engine.has_explicit_time_at(text, ctx.now);
    log::info!("{text:?} has an explicit time: {has_time}");
    ctx.term.write_line(&has_time.to_string())?;
    Ok(())
}
