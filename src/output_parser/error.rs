//! Error types for question decoding and validation.

/// The response text did not structurally match the expected schema.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The LLM response was empty or whitespace-only after preprocessing.
    #[error("empty LLM response")]
    EmptyResponse,

    /// No JSON object could be located in the response.
    #[error("no JSON object found in LLM response: {text}")]
    Unparseable {
        /// A truncated copy of the cleaned LLM text (max 200 chars).
        text: String,
    },

    /// A JSON object was found but does not have exactly the expected fields and types.
    #[error("JSON does not match the {target} schema: {reason}")]
    DeserializationFailed {
        /// Name of the type being decoded.
        target: &'static str,
        /// The serde error message.
        reason: String,
        /// The JSON candidate that failed (max 200 chars).
        raw_json: String,
    },
}

/// The response decoded cleanly but breaks a question invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("MCQ must contain exactly 4 options, found {found}")]
    WrongOptionCount { found: usize },

    #[error("correct answer '{answer}' is not one of the options")]
    AnswerNotInOptions { answer: String },

    #[error("fill-in-the-blank question must contain '___'")]
    MissingBlankMarker,
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
