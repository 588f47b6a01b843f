//! Google Sheets values API client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use super::error::SheetsError;

/// Public Sheets API endpoint.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// How the data is laid out in the request.
const MAJOR_DIMENSION: &str = "ROWS";
/// Cells are parsed as if typed by a user, so formulas are evaluated.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";
/// New rows are inserted instead of overwriting.
const INSERT_DATA_OPTION: &str = "INSERT_ROWS";

/// Append request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    major_dimension: &'a str,
    values: &'a [Vec<Value>],
}

/// Summary of the cells written by an append.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendUpdates {
    /// Range that received the values.
    #[serde(default)]
    pub updated_range: Option<String>,
    /// Number of rows written.
    #[serde(default)]
    pub updated_rows: usize,
    /// Number of cells written.
    #[serde(default)]
    pub updated_cells: usize,
}

/// Response of `values:append`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    /// Spreadsheet written to.
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Table the rows were appended after.
    #[serde(default)]
    pub table_range: Option<String>,
    /// Write summary.
    #[serde(default)]
    pub updates: AppendUpdates,
}

/// Google error envelope.
#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Minimal Sheets client authenticated with an OAuth bearer token.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl GoogleSheetsClient {
    /// Creates a client for the public Sheets API.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self, SheetsError> {
        let base_url = Url::parse(SHEETS_API_BASE)
            .map_err(|e| SheetsError::NetworkError(format!("invalid API base: {e}")))?;
        Self::with_base_url(access_token, timeout, base_url)
    }

    /// Creates a client against a custom API base, e.g. a local mock.
    pub fn with_base_url(
        access_token: impl Into<String>,
        timeout: Duration,
        base_url: Url,
    ) -> Result<Self, SheetsError> {
        if base_url.cannot_be_a_base() {
            return Err(SheetsError::NetworkError(format!(
                "invalid API base: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            access_token: access_token.into(),
            base_url,
        })
    }

    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Appends rows after the last table row found in `range`.
    pub async fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
    ) -> Result<AppendResponse, SheetsError> {
        let mut url = self.api_url(&[
            "v4",
            "spreadsheets",
            spreadsheet_id,
            "values",
            &format!("{range}:append"),
        ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION)
            .append_pair("insertDataOption", INSERT_DATA_OPTION);

        info!(range, rows = values.len(), "Appending rows to Google Sheets");

        let body = ValueRange {
            major_dimension: MAJOR_DIMENSION,
            values,
        };
        let response: AppendResponse = self.post_json(url, &body).await?;

        debug!(
            updated_range = ?response.updates.updated_range,
            updated_rows = response.updates.updated_rows,
            "Append finished"
        );
        Ok(response)
    }

    /// Resets `userEnteredFormat` on a sheet from the given row and column on.
    pub async fn reset_format(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        start_row_index: i64,
        start_column_index: i64,
    ) -> Result<(), SheetsError> {
        let url = self.api_url(&["v4", "spreadsheets", &format!("{spreadsheet_id}:batchUpdate")]);

        let body = json!({
            "requests": [{
                "repeatCell": {
                    "fields": "userEnteredFormat",
                    "range": {
                        "sheetId": sheet_id,
                        "startRowIndex": start_row_index,
                        "startColumnIndex": start_column_index,
                    }
                }
            }]
        });

        info!(sheet_id, "Resetting sheet format");
        let _: Value = self.post_json(url, &body).await?;
        Ok(())
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, SheetsError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| SheetsError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read error response body: {e}");
                String::new()
            });
            let message = serde_json::from_str::<GoogleErrorBody>(&error_text).map_or(
                error_text,
                |body| match body.error.status {
                    Some(status) => format!("{status}: {}", body.error.message),
                    None => body.error.message,
                },
            );
            return Err(SheetsError::ApiRequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SheetsError::InvalidResponseFormat(e.to_string()))
    }
}
