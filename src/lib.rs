//! # jira-metrics
//!
//! Turns Jira sprint reports into spreadsheet rows.
//!
//! Each issue of a closed sprint becomes one row carrying its discipline,
//! estimate and a classification flag: planned and completed, carried over,
//! added mid-sprint, or removed. Disciplines come from a bracketed title tag
//! when present, otherwise from the issue's custom field or first component,
//! and are memoized per run.
//!
//! ## Quick Start
//!
//! ```rust
//! use jira_metrics::report::simplify_sprint_name;
//!
//! assert_eq!(simplify_sprint_name("IMR Sprint 2021-W05-06"), "2021-W05-06");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod jira;
pub mod report;
pub mod sheets;
pub mod sync;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of jira-metrics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
