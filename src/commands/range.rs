//! Range command handler.

use std::fmt::Write;

use anyhow::{Context as _, Result};
use console::style;

use super::{resolve, OutputFormat};
use crate::context::AppContext;
use crate::format::{self, InsertMode};
use crate::range::DateRange;

fn describe(ctx: &AppContext, range: &DateRange) -> Result<String> {
    let mut string = String::new();
    let _ = writeln!(
        string,
        "{}",
        style(format::range(&ctx.settings, range).context("could not format range")?).bold()
    );
    for day in &range.days {
        let _ = writeln!(
            string,
            "- {} {}",
            day.format(&ctx.settings.format),
            style(day.format("%A")).dim()
        );
    }
    Ok(string)
}

/// Run the range command.
///
/// Falls back to a point result when `text` names no range.
///
/// # Errors
///
/// Returns an error if formatting or terminal I/O fails.
pub fn run(ctx: &AppContext, text: &str, output: OutputFormat) -> Result<()> {
    log::info!("Resolving {text:?} as a range...");
    let Some(range) = ctx.resolve_range(text) else {
        log::info!("{text:?} names no range, resolving it as a date instead...");
        return resolve::run(ctx, text, InsertMode::Clean, output);
    };

    match output {
        OutputFormat::Text => ctx.term.write_str(&describe(ctx, &range)?)?,
        OutputFormat::Json => ctx.term.write_line(
            &serde_json::to_string(&range).context("failed to serialize range")?,
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::Settings;
    use crate::engine::Engine;

    #[test]
    fn lists_every_day() {
        let settings = Settings::default();
        let engine = Engine::new(&settings.languages);
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let ctx = AppContext::at(settings, engine, now);

        console::set_colors_enabled(false);
        let range = ctx.resolve_range("from monday to wednesday").unwrap();
        let text = describe(&ctx, &range).unwrap();
        assert_eq!(
            text,
            "2026-10-19 to 2026-10-21\n- 2026-10-19 Monday\n- 2026-10-20 Tuesday\n- 2026-10-21 Wednesday\n"
        );
    }
}
