//! Mock backend for testing without a live provider.
//!
//! [`MockBackend`] returns pre-configured replies in order and records every
//! request it receives, so tests can assert which calls were made, in what
//! order, and how many times.
//!
//! # Example
//!
//! ```
//! use soul_curator::backend::{MockBackend, MockReply};
//!
//! let mock = MockBackend::new(vec![
//!     MockReply::grounded(r#"{"summary": "s", "facts": ["f"]}"#, ["https://example.com"]),
//!     MockReply::image("image/png", "iVBORw0KGgo="),
//! ]);
//! assert_eq!(mock.call_count(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, GenerateRequest, GenerateResponse, InlineData};
use crate::error::Result;
use crate::PipelineError;

/// One canned reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A successful response.
    Respond(GenerateResponse),
    /// The call fails as if the provider were unreachable.
    Fail(String),
}

impl MockReply {
    /// Text-only reply.
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Respond(GenerateResponse::text(text))
    }

    /// Text reply with grounding citations.
    pub fn grounded<I, S>(text: impl Into<String>, citations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut response = GenerateResponse::text(text);
        response.citations = citations.into_iter().map(Into::into).collect();
        MockReply::Respond(response)
    }

    /// Reply carrying one inline image.
    pub fn image(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        let mut response = GenerateResponse::text("");
        response.inline_data.push(InlineData {
            mime_type: Some(mime_type.into()),
            data: base64_data.into(),
        });
        MockReply::Respond(response)
    }

    /// Provider failure.
    pub fn fail(reason: impl Into<String>) -> Self {
        MockReply::Fail(reason.into())
    }
}

/// A test backend that returns canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl MockBackend {
    /// Create a mock backend with the given canned replies.
    ///
    /// Replies are returned in order. When exhausted, cycles from the beginning.
    pub fn new(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "MockBackend requires at least one reply");
        Self {
            replies,
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same text.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::new(vec![MockReply::text(text)])
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<GenerateRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn next_reply(&self) -> MockReply {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn generate(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        match self.next_reply() {
            MockReply::Respond(response) => Ok(response),
            MockReply::Fail(reason) => Err(PipelineError::ProviderUnavailable(reason)),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
