//! Jira-specific error handling.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Jira API specific errors.
#[derive(Error, Debug)]
pub enum JiraError {
    /// Username or API token missing.
    #[error("Jira credentials not found. Set JIRA_USERNAME and JIRA_TOKEN")]
    MissingCredentials,

    /// The configured endpoint prefix is not a usable base URL.
    #[error("Invalid Jira endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Jira answered with a non-success status.
    #[error("Jira API request failed (HTTP {status}): {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Invalid response format from Jira API: {0}")]
    InvalidResponseFormat(String),
}

/// Error body Jira returns on 4xx/5xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Free-form error messages.
    #[serde(default)]
    pub error_messages: Vec<String>,
    /// Field-level errors.
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl ErrorResponse {
    /// Parses an error body, falling back to the raw text when it is not JSON.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(parsed) => parsed.message(),
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => "Unknown error".to_string(),
        }
    }

    /// Returns a one-line summary of the error.
    pub fn message(&self) -> String {
        if !self.error_messages.is_empty() {
            return format!("ErrorMessages: {}", self.error_messages.join("; "));
        }
        if !self.errors.is_empty() {
            let pairs: Vec<String> = self
                .errors
                .iter()
                .map(|(field, msg)| format!("{field}: {msg}"))
                .collect();
            return format!("Errors: {}", pairs.join("; "));
        }
        "Unknown error".to_string()
    }
}
