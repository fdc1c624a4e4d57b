//! # Question Output Parser
//!
//! Turns raw model text into a validated question, or fails closed.
//!
//! Parsing happens in two steps:
//!
//! | Step | Function | Failure |
//! |------|----------|---------|
//! | Strict decode | [`parse_question`] | [`ParseError`] |
//! | Domain checks | [`QuizQuestion::validate`](crate::schema::QuizQuestion::validate) | [`ValidationError`] |
//!
//! [`parse_and_validate`] runs both in one call. The generator runs them
//! separately so it can report which step failed.
//!
//! The decode step only *locates* the JSON object in the response (think
//! blocks, markdown fences, surrounding prose). It never repairs or coerces
//! the object itself: unknown, missing or mistyped fields are errors.

pub mod error;
pub mod extract;
pub mod json;
pub mod validate;

pub use error::{ParseError, ValidationError};
pub use extract::{preprocess, strip_think_tags};
pub use json::parse_question;

use crate::error::Result;
use crate::schema::QuizQuestion;

/// Decode `response` into `Q` and check its invariants.
///
/// Never returns a partially valid question.
pub fn parse_and_validate<Q: QuizQuestion>(response: &str) -> Result<Q> {
    let question: Q = parse_question(response)?;
    question.validate()?;
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use crate::schema::{FillBlankQuestion, McqQuestion};

    #[test]
    fn test_valid_mcq_passes_both_steps() {
        let raw = r#"{"question":"2+2?","options":["3","4","5","6"],"correct_answer":"4"}"#;
        let q: McqQuestion = parse_and_validate(raw).unwrap();
        assert_eq!(q.correct_answer, "4");
    }

    #[test]
    fn test_structural_failure_is_parse_error() {
        let err = parse_and_validate::<McqQuestion>("not json at all").unwrap_err();
        assert!(matches!(err, QuizError::Parse(_)));
    }

    #[test]
    fn test_semantic_failure_is_validation_error() {
        let raw = r#"{"question":"2+2?","options":["3","4","5"],"correct_answer":"4"}"#;
        let err = parse_and_validate::<McqQuestion>(raw).unwrap_err();
        assert!(matches!(
            err,
            QuizError::Validation(ValidationError::WrongOptionCount { found: 3 })
        ));
    }

    #[test]
    fn test_fill_blank_without_marker_is_rejected() {
        let raw = r#"{"question":"What is the capital of France?","answer":"Paris"}"#;
        let err = parse_and_validate::<FillBlankQuestion>(raw).unwrap_err();
        assert!(matches!(
            err,
            QuizError::Validation(ValidationError::MissingBlankMarker)
        ));
    }
}
