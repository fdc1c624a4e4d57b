use std::time::Duration;
use thiserror::Error;

use crate::output_parser::{ParseError, ValidationError};
use crate::schema::QuestionKind;

/// Errors produced by the quiz pipeline and its components.
#[derive(Error, Debug)]
pub enum QuizError {
    /// Low-level HTTP transport failure (connection refused, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations when
    /// the provider returns a non-success status code (auth, rate limit, 5xx).
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 401, 429, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// The LLM call did not finish within the per-call timeout.
    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered but the completion text was empty.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The response text did not decode into the expected question shape.
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// The response decoded but broke a question invariant.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Every allowed attempt failed. Terminal: never retried.
    #[error("{kind} generation failed after {attempts} attempts: {last_cause}")]
    GenerationExhausted {
        kind: QuestionKind,
        attempts: u32,
        #[source]
        last_cause: Box<QuizError>,
    },

    /// Invalid configuration detected while loading settings or building a client.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The caller asked for something outside the allowed inputs.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// CSV encoding or decoding failed during export.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    /// Whether the remote call itself failed (network, auth, rate limit, timeout, empty body).
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            QuizError::Request(_)
                | QuizError::HttpError { .. }
                | QuizError::Timeout(_)
                | QuizError::EmptyResponse
        )
    }

    /// Whether the generator may spend another attempt on this failure.
    ///
    /// Only service, parse and validation failures qualify. Configuration and
    /// request errors surface immediately.
    pub fn is_retryable(&self) -> bool {
        self.is_service_error()
            || matches!(self, QuizError::Parse(_) | QuizError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
