//! Destinations for sprint rows.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use super::client::GoogleSheetsClient;

/// Writes value rows to a tabular destination.
pub trait SheetWriter: Send + Sync {
    /// Appends rows to `range`. Returns the number of rows written.
    fn append_rows<'a>(
        &'a self,
        range: &'a str,
        rows: &'a [Vec<Value>],
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>>;

    /// Resets the formatting of a sheet below its header row.
    fn reset_format<'a>(
        &'a self,
        sheet_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Writes to one Google spreadsheet.
pub struct SpreadsheetWriter {
    client: GoogleSheetsClient,
    spreadsheet_id: String,
}

impl SpreadsheetWriter {
    /// Creates a writer for the spreadsheet `spreadsheet_id`.
    pub fn new(client: GoogleSheetsClient, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}

impl SheetWriter for SpreadsheetWriter {
    fn append_rows<'a>(
        &'a self,
        range: &'a str,
        rows: &'a [Vec<Value>],
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>> {
        Box::pin(async move {
            if rows.is_empty() {
                return Ok(0);
            }
            let response = self
                .client
                .append(&self.spreadsheet_id, range, rows)
                .await
                .with_context(|| format!("Failed to append rows to '{range}'"))?;
            Ok(response.updates.updated_rows)
        })
    }

    fn reset_format<'a>(
        &'a self,
        sheet_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .reset_format(&self.spreadsheet_id, sheet_id, 1, 0)
                .await
                .with_context(|| format!("Failed to reset format of sheet {sheet_id}"))
        })
    }
}

#[derive(Serialize)]
struct DryRunAppend<'a> {
    range: &'a str,
    rows: &'a [Vec<Value>],
}

/// Prints rows as YAML instead of writing them anywhere.
pub struct DryRunWriter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl DryRunWriter {
    /// Creates a dry-run writer printing to stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates a dry-run writer printing to `out`.
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl SheetWriter for DryRunWriter {
    fn append_rows<'a>(
        &'a self,
        range: &'a str,
        rows: &'a [Vec<Value>],
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>> {
        Box::pin(async move {
            let yaml = serde_yaml::to_string(&DryRunAppend { range, rows })
                .context("Failed to serialize rows to YAML")?;
            let mut out = self
                .out
                .lock()
                .map_err(|_| anyhow::anyhow!("dry-run output lock poisoned"))?;
            writeln!(out, "---\n{yaml}")?;
            Ok(rows.len())
        })
    }

    fn reset_format<'a>(
        &'a self,
        _sheet_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}
