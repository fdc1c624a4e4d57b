//! Mock backend for testing without a live LLM.
//!
//! [`MockBackend`] plays back a script of replies in order, so retry and
//! batch behavior can be tested deterministically.
//!
//! # Example
//!
//! ```
//! use quiz_pipeline::backend::{MockBackend, MockReply};
//!
//! let mock = MockBackend::new(vec![
//!     MockReply::Status(503),
//!     MockReply::text(r#"{"question": "H2O is ___.", "answer": "water"}"#),
//! ]);
//! assert_eq!(mock.calls(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, LlmRequest, LlmResponse};
use crate::error::{QuizError, Result};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Succeed with this completion text.
    Text(String),
    /// Fail as if the provider answered with this HTTP status.
    Status(u16),
}

impl MockReply {
    pub fn text(s: impl Into<String>) -> Self {
        MockReply::Text(s.into())
    }
}

/// A test backend that returns scripted replies in order.
///
/// Cycles back to the beginning when the script is exhausted. An empty
/// script behaves like a provider that always returns an empty body.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always returns the same text.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![MockReply::Text(response.into())])
    }

    /// A mock that plays back successful texts in order.
    pub fn texts<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|s| MockReply::Text(s.into())).collect())
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<MockReply> {
        let idx = self.index.fetch_add(1, Ordering::Relaxed);
        if self.replies.is_empty() {
            return None;
        }
        Some(self.replies[idx % self.replies.len()].clone())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        match self.next_reply() {
            Some(MockReply::Text(text)) => Ok(LlmResponse {
                text,
                status: 200,
                metadata: None,
            }),
            Some(MockReply::Status(status)) => Err(QuizError::HttpError {
                status,
                body: format!("mock status {}", status),
                retry_after: None,
            }),
            None => Ok(LlmResponse {
                text: String::new(),
                status: 200,
                metadata: None,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
