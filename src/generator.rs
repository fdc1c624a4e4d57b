//! Retry-orchestrating question generator.
//!
//! [`QuestionGenerator`] runs one question through
//! `Building → Calling → Parsing → Validating` and retries the whole cycle,
//! with a freshly built prompt, when a retryable step fails.
//!
//! ```text
//!            ┌──────────────────── Retrying ◄─────────────────┐
//!            ▼                                      (attempt < max)
//!        Building ──► Calling ──► Parsing ──► Validating ──► Succeeded
//!                        │           │            │
//!                        └───────────┴────────────┴──► Failed (attempt == max)
//! ```
//!
//! Only service, parse and validation failures are retried. Anything else is
//! a defect or a bad request and is returned as-is on the first occurrence.

use std::sync::Arc;

use crate::client::LlmClient;
use crate::error::{QuizError, Result};
use crate::events::{emit, AttemptStage, Event, EventHandler};
use crate::output_parser::parse_question;
use crate::prompt::build_prompt;
use crate::retry::RetryConfig;
use crate::schema::{
    Difficulty, FillBlankQuestion, GeneratedQuestion, McqQuestion, QuestionKind, QuizQuestion,
};

/// A failed attempt and the step it failed in.
struct AttemptFailure {
    stage: AttemptStage,
    error: QuizError,
}

impl AttemptFailure {
    fn new(stage: AttemptStage, error: impl Into<QuizError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

/// Generates validated questions with bounded retry.
///
/// # Example
///
/// ```no_run
/// use quiz_pipeline::{Difficulty, LlmClient, QuestionGenerator, RetryConfig};
///
/// # async fn run() -> quiz_pipeline::Result<()> {
/// let client = LlmClient::builder("https://api.groq.com/openai")
///     .api_key("gsk_...")
///     .build()?;
/// let generator = QuestionGenerator::new(client).with_retry(RetryConfig::new(3));
/// let q = generator.generate_mcq("Indian History", Difficulty::Medium).await?;
/// println!("{} -> {}", q.question, q.correct_answer);
/// # Ok(())
/// # }
/// ```
pub struct QuestionGenerator {
    client: LlmClient,
    retry: RetryConfig,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl QuestionGenerator {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
            event_handler: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Report attempts, failures and outcomes to `handler`.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn retry(&self) -> RetryConfig {
        self.retry
    }

    pub(crate) fn event_handler(&self) -> &Option<Arc<dyn EventHandler>> {
        &self.event_handler
    }

    /// Generate one validated multiple-choice question.
    pub async fn generate_mcq(&self, topic: &str, difficulty: Difficulty) -> Result<McqQuestion> {
        self.generate_as::<McqQuestion>(topic, difficulty).await
    }

    /// Generate one validated fill-in-the-blank question.
    pub async fn generate_fill_blank(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<FillBlankQuestion> {
        self.generate_as::<FillBlankQuestion>(topic, difficulty).await
    }

    /// Generate one question of `kind`, projected into the session record.
    pub async fn generate(
        &self,
        kind: QuestionKind,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<GeneratedQuestion> {
        match kind {
            QuestionKind::Mcq => self.generate_mcq(topic, difficulty).await.map(Into::into),
            QuestionKind::FillBlank => self
                .generate_fill_blank(topic, difficulty)
                .await
                .map(Into::into),
        }
    }

    /// Run the retry loop for any question type.
    pub async fn generate_as<Q: QuizQuestion>(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Q> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuizError::InvalidRequest("topic must not be empty".into()));
        }

        let kind = Q::KIND;
        let max_attempts = self.retry.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            emit(
                &self.event_handler,
                Event::AttemptStart {
                    kind,
                    topic: topic.to_string(),
                    difficulty,
                    attempt,
                    max_attempts,
                },
            );

            let failure = match self.attempt::<Q>(topic, difficulty).await {
                Ok(question) => {
                    emit(
                        &self.event_handler,
                        Event::QuestionReady {
                            kind,
                            topic: topic.to_string(),
                            attempt,
                        },
                    );
                    return Ok(question);
                }
                Err(failure) => failure,
            };

            let retryable = failure.error.is_retryable();
            let will_retry = retryable && self.retry.should_retry(attempt);
            emit(
                &self.event_handler,
                Event::AttemptFailed {
                    kind,
                    topic: topic.to_string(),
                    difficulty,
                    attempt,
                    stage: failure.stage,
                    reason: failure.error.to_string(),
                    will_retry,
                },
            );

            if !retryable {
                return Err(failure.error);
            }
            if !will_retry {
                emit(
                    &self.event_handler,
                    Event::Exhausted {
                        kind,
                        topic: topic.to_string(),
                        attempts: attempt,
                        reason: failure.error.to_string(),
                    },
                );
                return Err(QuizError::GenerationExhausted {
                    kind,
                    attempts: attempt,
                    last_cause: Box::new(failure.error),
                });
            }
        }
    }

    /// One pass through the cycle. The prompt is rebuilt every time.
    async fn attempt<Q: QuizQuestion>(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> std::result::Result<Q, AttemptFailure> {
        let prompt = build_prompt(Q::KIND, topic, difficulty);

        let raw = self
            .client
            .complete(&prompt)
            .await
            .map_err(|e| AttemptFailure::new(AttemptStage::Calling, e))?;

        let question: Q = parse_question(&raw)
            .map_err(|e| AttemptFailure::new(AttemptStage::Parsing, e))?;

        question
            .validate()
            .map_err(|e| AttemptFailure::new(AttemptStage::Validating, e))?;

        Ok(question)
    }
}

impl std::fmt::Debug for QuestionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionGenerator")
            .field("client", &self.client)
            .field("retry", &self.retry)
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, MockReply};
    use crate::events::FnEventHandler;
    use crate::output_parser::ValidationError;
    use std::sync::Mutex;

    const VALID_MCQ: &str = r#"{"question": "Capital of France?", "options": ["Paris", "Rome", "Madrid", "Berlin"], "correct_answer": "Paris"}"#;
    const THREE_OPTIONS: &str = r#"{"question": "Capital of France?", "options": ["Paris", "Rome", "Madrid"], "correct_answer": "Paris"}"#;
    const ANSWER_OUTSIDE: &str = r#"{"question": "Capital of France?", "options": ["Lyon", "Rome", "Madrid", "Berlin"], "correct_answer": "Paris"}"#;
    const VALID_FILL: &str = r#"{"question": "The capital of France is ___.", "answer": "Paris"}"#;
    const NO_BLANK: &str = r#"{"question": "What is the capital of France?", "answer": "Paris"}"#;

    fn generator(mock: Arc<MockBackend>, attempts: u32) -> QuestionGenerator {
        let client = LlmClient::builder("http://mock").backend(mock).build().unwrap();
        QuestionGenerator::new(client).with_retry(RetryConfig::new(attempts))
    }

    #[tokio::test]
    async fn test_happy_path_single_call() {
        let mock = Arc::new(MockBackend::fixed(VALID_MCQ));
        let q = generator(mock.clone(), 3)
            .generate_mcq("France", Difficulty::Easy)
            .await
            .unwrap();
        assert_eq!(q.correct_answer, "Paris");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_always_unparseable_exhausts_after_exactly_three_attempts() {
        let mock = Arc::new(MockBackend::fixed("I'm sorry, I can't do JSON today."));
        let err = generator(mock.clone(), 3)
            .generate_mcq("France", Difficulty::Medium)
            .await
            .unwrap_err();

        match err {
            QuizError::GenerationExhausted {
                kind,
                attempts,
                last_cause,
            } => {
                assert_eq!(kind, QuestionKind::Mcq);
                assert_eq!(attempts, 3);
                assert!(matches!(*last_cause, QuizError::Parse(_)));
            }
            other => panic!("expected GenerationExhausted, got {:?}", other),
        }
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_after_transient_failures() {
        let mock = Arc::new(MockBackend::new(vec![
            MockReply::Status(503),
            MockReply::text("not json"),
            MockReply::text(VALID_MCQ),
        ]));
        let q = generator(mock.clone(), 3)
            .generate_mcq("France", Difficulty::Medium)
            .await
            .unwrap();
        assert_eq!(q.options.len(), 4);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_invalid_mcq_is_retried_never_returned() {
        let mock = Arc::new(MockBackend::new(vec![
            MockReply::text(THREE_OPTIONS),
            MockReply::text(ANSWER_OUTSIDE),
            MockReply::text(VALID_MCQ),
        ]));
        let q = generator(mock.clone(), 3)
            .generate_mcq("France", Difficulty::Hard)
            .await
            .unwrap();
        assert_eq!(q.options.len(), 4);
        assert!(q.options.contains(&q.correct_answer));
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_blank_marker_exhausts_with_validation_cause() {
        let mock = Arc::new(MockBackend::fixed(NO_BLANK));
        let err = generator(mock.clone(), 2)
            .generate_fill_blank("France", Difficulty::Easy)
            .await
            .unwrap_err();
        match err {
            QuizError::GenerationExhausted {
                attempts,
                last_cause,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert!(matches!(
                    *last_cause,
                    QuizError::Validation(ValidationError::MissingBlankMarker)
                ));
            }
            other => panic!("expected GenerationExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fill_blank_projects_into_record() {
        let mock = Arc::new(MockBackend::fixed(VALID_FILL));
        let record = generator(mock, 3)
            .generate(QuestionKind::FillBlank, "France", Difficulty::Medium)
            .await
            .unwrap();
        assert_eq!(record.kind, QuestionKind::FillBlank);
        assert_eq!(record.correct_answer, "Paris");
        assert!(record.options.is_none());
    }

    #[tokio::test]
    async fn test_prompt_rebuilt_each_attempt() {
        let mock = Arc::new(MockBackend::new(vec![
            MockReply::text("nope"),
            MockReply::text(VALID_FILL),
        ]));
        generator(mock.clone(), 3)
            .generate_fill_blank("  France  ", Difficulty::Hard)
            .await
            .unwrap();
        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
        assert!(prompts[0].contains("hard fill-in-the-blank question about France."));
    }

    #[tokio::test]
    async fn test_empty_topic_rejected_without_calling() {
        let mock = Arc::new(MockBackend::fixed(VALID_MCQ));
        let err = generator(mock.clone(), 3)
            .generate_mcq("   ", Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidRequest(_)));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_events_report_each_attempt() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mock = Arc::new(MockBackend::new(vec![MockReply::Status(429), MockReply::text(VALID_MCQ)]));
        generator(mock, 3)
            .with_event_handler(Arc::new(FnEventHandler(move |e: Event| sink.lock().unwrap().push(e))))
            .generate_mcq("France", Difficulty::Easy)
            .await
            .unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Event::AttemptStart { attempt: 1, max_attempts: 3, .. }));
        assert!(matches!(
            events[1],
            Event::AttemptFailed {
                attempt: 1,
                stage: AttemptStage::Calling,
                will_retry: true,
                ..
            }
        ));
        assert!(matches!(events[2], Event::AttemptStart { attempt: 2, .. }));
        assert!(matches!(events[3], Event::QuestionReady { attempt: 2, .. }));
    }

    #[tokio::test]
    async fn test_failing_stage_is_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mock = Arc::new(MockBackend::new(vec![MockReply::text("prose"), MockReply::text(THREE_OPTIONS)]));
        let _ = generator(mock, 2)
            .with_event_handler(Arc::new(FnEventHandler(move |e: Event| sink.lock().unwrap().push(e))))
            .generate_mcq("France", Difficulty::Easy)
            .await;

        let stages: Vec<(AttemptStage, bool)> = seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::AttemptFailed { stage, will_retry, .. } => Some((*stage, *will_retry)),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![(AttemptStage::Parsing, true), (AttemptStage::Validating, false)]
        );
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, Event::Exhausted { attempts: 2, .. })));
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let mock = Arc::new(MockBackend::new(vec![MockReply::Status(500), MockReply::text(VALID_MCQ)]));
        let err = generator(mock.clone(), 1)
            .generate_mcq("France", Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::GenerationExhausted { attempts: 1, .. }));
        assert_eq!(mock.calls(), 1);
    }
}
