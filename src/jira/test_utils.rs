//! Shared test utilities for the `jira` module.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::model::{Component, IssueDetails};
use super::IssueDetailsSource;

/// Mock issue source with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order. When the queue is exhausted,
/// subsequent calls return `Err("no more mock responses")`.
///
/// Every call records the requested key. Use [`request_handle`](Self::request_handle)
/// to read the log after the source has been moved into a resolver.
pub(crate) struct ConfigurableMockIssueSource {
    responses: Arc<Mutex<VecDeque<Result<IssueDetails>>>>,
    requested_keys: Arc<Mutex<Vec<String>>>,
}

impl ConfigurableMockIssueSource {
    /// Creates a mock that returns the given responses in order.
    pub(crate) fn new(responses: Vec<Result<IssueDetails>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requested_keys: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle for inspecting which keys were requested.
    pub(crate) fn request_handle(&self) -> RequestLogHandle {
        RequestLogHandle {
            requested_keys: self.requested_keys.clone(),
        }
    }
}

/// Shared handle to a mock source's request log.
pub(crate) struct RequestLogHandle {
    requested_keys: Arc<Mutex<Vec<String>>>,
}

impl RequestLogHandle {
    /// Returns every key requested so far.
    pub(crate) fn keys(&self) -> Vec<String> {
        self.requested_keys.lock().unwrap().clone()
    }

    /// Returns the number of fetches made.
    pub(crate) fn request_count(&self) -> usize {
        self.requested_keys.lock().unwrap().len()
    }
}

impl IssueDetailsSource for ConfigurableMockIssueSource {
    fn issue_details<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<IssueDetails>> + Send + 'a>> {
        let responses = self.responses.clone();
        let recorded = self.requested_keys.clone();
        let key = key.to_string();
        Box::pin(async move {
            recorded.lock().unwrap().push(key);
            responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }
}

/// Builds issue details with the given discipline field and component names.
pub(crate) fn details(key: &str, discipline: Option<&str>, components: &[&str]) -> IssueDetails {
    IssueDetails {
        key: key.to_string(),
        summary: String::new(),
        components: components
            .iter()
            .map(|name| Component {
                name: (*name).to_string(),
                description: None,
            })
            .collect(),
        discipline: discipline.map(String::from),
    }
}
