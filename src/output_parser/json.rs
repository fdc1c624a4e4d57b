//! Strict JSON decoding of model responses into question types.

use crate::output_parser::error::{truncate, ParseError};
use crate::output_parser::extract::{fenced_block, last_json_object, preprocess};
use crate::schema::QuizQuestion;

/// Decode an LLM response into a question type, failing closed.
///
/// The JSON object is located in this order:
/// 1. The whole preprocessed text, if it is a bare object
/// 2. A fenced code block (`` ```json `` preferred)
/// 3. The last balanced `{...}` region in the text
///
/// The located object must then deserialize into `Q` exactly: unknown
/// fields, missing fields and wrong types are all [`ParseError::DeserializationFailed`].
///
/// # Examples
///
/// ```
/// use quiz_pipeline::output_parser::parse_question;
/// use quiz_pipeline::schema::FillBlankQuestion;
///
/// let raw = "```json\n{\"question\": \"H2O is ___.\", \"answer\": \"water\"}\n```";
/// let q: FillBlankQuestion = parse_question(raw).unwrap();
/// assert_eq!(q.answer, "water");
/// ```
pub fn parse_question<Q: QuizQuestion>(response: &str) -> Result<Q, ParseError> {
    let cleaned = preprocess(response);
    if cleaned.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let candidate = locate_object(&cleaned).ok_or_else(|| ParseError::Unparseable {
        text: truncate(&cleaned, 200),
    })?;

    serde_json::from_str::<Q>(candidate).map_err(|e| ParseError::DeserializationFailed {
        target: Q::KIND.label(),
        reason: e.to_string(),
        raw_json: truncate(candidate, 200),
    })
}

fn locate_object(cleaned: &str) -> Option<&str> {
    if cleaned.starts_with('{') && cleaned.ends_with('}') {
        return Some(cleaned);
    }
    if let Some(block) = fenced_block(cleaned) {
        if block.starts_with('{') {
            return Some(block);
        }
    }
    last_json_object(cleaned)
}
