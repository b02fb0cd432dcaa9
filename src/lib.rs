#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod arbitrator;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod format;
pub mod fuzzy;
pub mod keywords;
pub mod oracle;
pub mod range;
pub mod recognizers;
pub mod translations;

pub use calendar::WeekStart;
pub use engine::{Engine, Resolution, SharedEngine};
pub use error::{Error, Result};
pub use range::DateRange;
