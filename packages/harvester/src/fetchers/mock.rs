//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the ItemFetcher trait.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::ItemFetcher;
use crate::types::payload::RawPayload;

#[derive(Debug, Clone)]
enum MockResponse {
    Body(Value),
    Transport(String),
    InvalidJson(String),
}

/// Mock fetcher for testing.
///
/// Identifiers without a canned response return `{"Product": null}`, the
/// same shape the upstream API uses for unknown items.
///
/// # Example
///
/// ```rust
/// use harvester::fetchers::MockFetcher;
/// use serde_json::json;
///
/// let mock = MockFetcher::new()
///     .with_body(1, json!({ "Product": { "Stockcode": 1, "Price": 2.5 } }))
///     .with_transport_error(2, "connection reset");
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<i64, MockResponse>>>,
    fetch_calls: Arc<RwLock<Vec<i64>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, id: i64, response: MockResponse) {
        self.responses.write().unwrap().insert(id, response);
    }

    /// Return `body` for `id`.
    pub fn add_body(&self, id: i64, body: Value) {
        self.insert(id, MockResponse::Body(body));
    }

    /// Return `body` for `id` (builder pattern).
    pub fn with_body(self, id: i64, body: Value) -> Self {
        self.add_body(id, body);
        self
    }

    /// Fail `id` with a transport error.
    pub fn with_transport_error(self, id: i64, message: impl Into<String>) -> Self {
        self.insert(id, MockResponse::Transport(message.into()));
        self
    }

    /// Fail `id` with a parse error produced from `text`.
    pub fn with_invalid_json(self, id: i64, text: impl Into<String>) -> Self {
        self.insert(id, MockResponse::InvalidJson(text.into()));
        self
    }

    /// Get the number of times fetch was called.
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.read().unwrap().len()
    }

    /// Get the identifiers requested, in call order.
    pub fn fetch_calls(&self) -> Vec<i64> {
        self.fetch_calls.read().unwrap().clone()
    }

    /// Clear all recorded calls.
    pub fn reset_calls(&self) {
        self.fetch_calls.write().unwrap().clear();
    }
}

#[async_trait]
impl ItemFetcher for MockFetcher {
    async fn fetch(&self, id: i64) -> FetchResult<RawPayload> {
        self.fetch_calls.write().unwrap().push(id);

        let response = self.responses.read().unwrap().get(&id).cloned();
        match response {
            Some(MockResponse::Body(body)) => Ok(RawPayload::new(id, body)),
            Some(MockResponse::Transport(message)) => Err(FetchError::Transport {
                id,
                source: message.into(),
            }),
            Some(MockResponse::InvalidJson(text)) => RawPayload::parse(id, &text),
            None => Ok(RawPayload::new(id, json!({ "Product": null }))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
