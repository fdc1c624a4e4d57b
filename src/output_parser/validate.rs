//! Domain checks applied after a question decodes.

use crate::output_parser::error::ValidationError;
use crate::schema::{FillBlankQuestion, McqQuestion, BLANK_MARKER, MCQ_OPTION_COUNT};

/// Exactly four options, and the correct answer is one of them verbatim.
pub fn validate_mcq(q: &McqQuestion) -> Result<(), ValidationError> {
    if q.options.len() != MCQ_OPTION_COUNT {
        return Err(ValidationError::WrongOptionCount {
            found: q.options.len(),
        });
    }
    if !q.options.iter().any(|o| *o == q.correct_answer) {
        return Err(ValidationError::AnswerNotInOptions {
            answer: q.correct_answer.clone(),
        });
    }
    Ok(())
}

/// The stem must contain the blank marker.
pub fn validate_fill_blank(q: &FillBlankQuestion) -> Result<(), ValidationError> {
    if !q.question.contains(BLANK_MARKER) {
        return Err(ValidationError::MissingBlankMarker);
    }
    Ok(())
}
