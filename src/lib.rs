//! # Quiz Pipeline
//!
//! LLM-backed generation of multiple-choice and fill-in-the-blank quiz
//! questions, with strict parsing, validation, bounded retry and grading.
//!
//! ## Core Concepts
//!
//! - **[`LlmClient`]**: HTTP client for an OpenAI-compatible chat
//!   completions endpoint (Groq by default), behind a [`backend::Backend`]
//!   trait so tests can script replies with [`MockBackend`].
//! - **[`QuestionGenerator`]**: builds the prompt, calls the model, parses
//!   the reply into [`McqQuestion`] or [`FillBlankQuestion`], validates it,
//!   and retries the whole cycle up to [`RetryConfig::max_attempts`] times.
//! - **[`QuizSession`]**: generates a whole quiz (all or nothing), records
//!   answers and grades them into [`QuizResult`]s.
//! - **[`export`]**: CSV export of graded results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quiz_pipeline::{
//!     Difficulty, LlmClient, QuestionGenerator, QuestionKind, QuizRequest, QuizSession,
//!     RetryConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LlmClient::builder("https://api.groq.com/openai")
//!         .api_key(std::env::var("GROQ_API_KEY")?)
//!         .build()?;
//!     let generator = QuestionGenerator::new(client).with_retry(RetryConfig::new(3));
//!
//!     let mut session = QuizSession::new();
//!     let request = QuizRequest::new(QuestionKind::Mcq, "Indian History")
//!         .with_difficulty(Difficulty::Easy)
//!         .with_questions(3);
//!     session.generate_questions(&generator, &request).await?;
//!
//!     for (i, q) in session.questions().iter().enumerate() {
//!         println!("{}. {}", i + 1, q.question);
//!     }
//!     session.submit_answer(1, "Ashoka")?;
//!     session.evaluate();
//!     println!("{:?}", session.score());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod generator;
pub mod output_parser;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod session;

pub use backend::{MockBackend, MockReply, OpenAiBackend};
pub use client::{LlmClient, LlmClientBuilder, LlmConfig};
pub use config::QuizConfig;
pub use error::{QuizError, Result};
pub use events::{Event, EventHandler, FnEventHandler, LogEventHandler};
pub use generator::QuestionGenerator;
pub use output_parser::{ParseError, ValidationError};
pub use retry::RetryConfig;
pub use schema::{Difficulty, FillBlankQuestion, GeneratedQuestion, McqQuestion, QuestionKind};
pub use session::{QuestionCountBounds, QuizRequest, QuizResult, QuizScore, QuizSession};
