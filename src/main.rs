#![warn(clippy::pedantic)]

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use human_panic::setup_panic;

use nldates::{
    commands::{self, OutputFormat},
    config,
    context::AppContext,
    format::{InsertMode, Stamp},
    Engine, WeekStart,
};

/// nldates turns natural-language date expressions into dates, links and ranges
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(long = "config", default_value = "~/.config/nldates/config.toml")]
    config_path: PathBuf,

    /// Language to understand, in order of preference (repeatable, overrides the configuration)
    #[arg(long = "language", short = 'l')]
    languages: Vec<String>,

    /// First day of the week (overrides the configuration)
    #[arg(long)]
    week_start: Option<WeekStart>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve an expression to a date and print the text to insert
    Resolve {
        /// The expression, e.g. "next friday at 3pm"
        #[arg(required = true)]
        text: Vec<String>,

        /// How to render the resolved date
        #[arg(long, default_value = "replace")]
        mode: InsertMode,

        /// Output format
        #[arg(long, default_value = "text")]
        output: OutputFormat,
    },

    /// Resolve an expression to a range of days, e.g. "from monday to friday"
    Range {
        /// The expression
        #[arg(required = true)]
        text: Vec<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        output: OutputFormat,
    },

    /// Print whether an expression states a time of day
    HasTime {
        /// The expression
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Print the current date and time
    Now,

    /// Print the current date
    Today,

    /// Print the current time
    Time,
}

/// Expand a leading `~` component to `$HOME`; other paths are returned as is.
fn expand_homedir(path: &Path) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = env::var("HOME").context("cannot expand `~` without HOME")?;
            Ok(PathBuf::from(home).join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

fn main() -> anyhow::Result<()> {
    setup_panic!();
    env_logger::init();

    log::debug!("Parsing command line arguments...");
    let args = Args::parse();
    log::trace!("Parsed command line arguments: {args:#?}");

    let config_path = expand_homedir(&args.config_path)?;
    let mut settings = config::load(&config_path)?;
    if !args.languages.is_empty() {
        log::debug!("Overriding configured languages with {:?}...", args.languages);
        settings.languages = args.languages;
    }
    if let Some(week_start) = args.week_start {
        settings.week_start = week_start;
    }
    settings.translations = settings
        .translations
        .as_deref()
        .map(expand_homedir)
        .transpose()?;

    let translations = settings
        .translation_table()
        .context("could not load translations")?;
    let engine = Engine::with_translations(&settings.languages, &translations);
    let ctx = AppContext::new(settings, engine);

    match args.command {
        Command::Resolve { text, mode, output } => {
            commands::resolve::run(&ctx, &text.join(" "), mode, output)?;
        }
        Command::Range { text, output } => commands::range::run(&ctx, &text.join(" "), output)?,
        Command::HasTime { text } => commands::has_time::run(&ctx, &text.join(" "))?,
        Command::Now => commands::stamp::run(&ctx, Stamp::Now)?,
        Command::Today => commands::stamp::run(&ctx, Stamp::Today)?,
        Command::Time => commands::stamp::run(&ctx, Stamp::Time)?,
    }

    Ok(())
}
