//! Event system for generation lifecycle hooks.
//!
//! The generator and session report what they are doing through an
//! explicitly passed [`EventHandler`]. There is no global logger state in
//! the library: [`LogEventHandler`] forwards events to the `log` facade, and
//! whoever builds the generator decides whether to install one.

use std::sync::Arc;

use crate::schema::{Difficulty, QuestionKind};

/// Where in the per-question cycle an attempt failed.
///
/// Building the prompt cannot fail, so it has no stage here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStage {
    Calling,
    Parsing,
    Validating,
}

impl std::fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AttemptStage::Calling => "calling",
            AttemptStage::Parsing => "parsing",
            AttemptStage::Validating => "validating",
        })
    }
}

/// Events emitted during generation.
#[derive(Debug, Clone)]
pub enum Event {
    /// An attempt at one question is starting.
    AttemptStart {
        kind: QuestionKind,
        topic: String,
        difficulty: Difficulty,
        /// 1-indexed.
        attempt: u32,
        max_attempts: u32,
    },
    /// An attempt failed.
    AttemptFailed {
        kind: QuestionKind,
        topic: String,
        difficulty: Difficulty,
        attempt: u32,
        stage: AttemptStage,
        reason: String,
        /// Whether another attempt follows.
        will_retry: bool,
    },
    /// A question was generated and validated.
    QuestionReady {
        kind: QuestionKind,
        topic: String,
        attempt: u32,
    },
    /// All attempts failed; the terminal error follows.
    Exhausted {
        kind: QuestionKind,
        topic: String,
        attempts: u32,
        reason: String,
    },
    /// A batch of questions is starting.
    BatchStart {
        kind: QuestionKind,
        topic: String,
        difficulty: Difficulty,
        num_questions: usize,
    },
    /// A batch finished. On failure `generated` is how many questions were
    /// discarded.
    BatchEnd { generated: usize, ok: bool },
}

/// Handler for generation events.
///
/// # Example
///
/// ```
/// use quiz_pipeline::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         if let Event::AttemptFailed { attempt, reason, .. } = event {
///             eprintln!("attempt {} failed: {}", attempt, reason);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}

/// Forwards events to the `log` facade under a fixed target.
#[derive(Debug, Clone)]
pub struct LogEventHandler {
    target: String,
}

impl LogEventHandler {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Default for LogEventHandler {
    fn default() -> Self {
        Self::new("quiz_pipeline")
    }
}

impl EventHandler for LogEventHandler {
    fn on_event(&self, event: Event) {
        let target = self.target.as_str();
        match event {
            Event::AttemptStart {
                kind,
                topic,
                difficulty,
                attempt,
                max_attempts,
            } => log::info!(
                target: target,
                "Generating question | type={}, topic={}, difficulty={}, attempt={}/{}",
                kind, topic, difficulty, attempt, max_attempts
            ),
            Event::AttemptFailed {
                kind,
                topic,
                difficulty,
                attempt,
                stage,
                reason,
                will_retry,
            } => {
                if will_retry {
                    log::warn!(
                        target: target,
                        "Generation attempt failed while {} | type={}, topic={}, difficulty={}, attempt={}: {}; retrying",
                        stage, kind, topic, difficulty, attempt, reason
                    );
                } else {
                    log::error!(
                        target: target,
                        "Generation attempt failed while {} | type={}, topic={}, difficulty={}, attempt={}: {}",
                        stage, kind, topic, difficulty, attempt, reason
                    );
                }
            }
            Event::QuestionReady {
                kind,
                topic,
                attempt,
            } => log::info!(
                target: target,
                "Validated {} question | topic={}, attempt={}",
                kind, topic, attempt
            ),
            Event::Exhausted {
                kind,
                topic,
                attempts,
                reason,
            } => log::error!(
                target: target,
                "{} generation failed after {} attempts | topic={}: {}",
                kind, attempts, topic, reason
            ),
            Event::BatchStart {
                kind,
                topic,
                difficulty,
                num_questions,
            } => log::info!(
                target: target,
                "Generating quiz | type={}, topic={}, difficulty={}, questions={}",
                kind, topic, difficulty, num_questions
            ),
            Event::BatchEnd { generated, ok } => {
                if ok {
                    log::info!(target: target, "Quiz ready with {} questions", generated);
                } else {
                    log::error!(
                        target: target,
                        "Quiz generation failed; discarded {} generated questions",
                        generated
                    );
                }
            }
        }
    }
}
