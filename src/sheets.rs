//! Google Sheets output: REST client and row writers.

pub mod client;
pub mod error;
pub mod writer;

pub use client::{AppendResponse, GoogleSheetsClient};
pub use error::SheetsError;
pub use writer::{DryRunWriter, SheetWriter, SpreadsheetWriter};
