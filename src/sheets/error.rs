//! Google Sheets error handling.

use thiserror::Error;

/// Google Sheets API errors.
#[derive(Error, Debug)]
pub enum SheetsError {
    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The API answered with a non-success status.
    #[error("Google Sheets request failed (HTTP {status}): {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Body returned by the API.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Invalid response format from Google Sheets API: {0}")]
    InvalidResponseFormat(String),
}
