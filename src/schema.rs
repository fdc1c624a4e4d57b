//! Question schemas and the session-facing question record.
//!
//! [`McqQuestion`] and [`FillBlankQuestion`] are the exact shapes the model is
//! asked to produce. Both reject unknown fields on decode, and both carry a
//! JSON Schema (via `schemars`) that is embedded into prompts as format
//! instructions.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;
use crate::output_parser::{validate, ValidationError};

/// Marker a fill-in-the-blank stem must contain.
pub const BLANK_MARKER: &str = "___";

/// Number of options every multiple-choice question carries.
pub const MCQ_OPTION_COUNT: usize = 4;

/// A multiple-choice question with four options, one of them correct.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct McqQuestion {
    /// The question text.
    pub question: String,
    /// Exactly four candidate answers.
    pub options: Vec<String>,
    /// The correct answer, copied verbatim from `options`.
    pub correct_answer: String,
}

/// A question whose stem contains `___` to be filled with a short answer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FillBlankQuestion {
    /// The question text, containing `___` where the answer belongs.
    pub question: String,
    /// The word or phrase that fills the blank.
    pub answer: String,
}

/// Which question shape to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "Fill in the blank")]
    FillBlank,
}

impl QuestionKind {
    /// Label used in results and exports.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Mcq => "MCQ",
            QuestionKind::FillBlank => "Fill in the blank",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuestionKind {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "mcq" | "multiple choice" => Ok(QuestionKind::Mcq),
            "fill blank" | "fill in the blank" | "fill in blank" => Ok(QuestionKind::FillBlank),
            _ => Err(QuizError::InvalidRequest(format!(
                "unknown question type '{}' (expected 'mcq' or 'fill-blank')",
                s.trim()
            ))),
        }
    }
}

/// How hard the generated question should be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuizError::InvalidRequest(format!(
                "unknown difficulty '{}' (expected easy, medium or hard)",
                other
            ))),
        }
    }
}

/// A question type the generator knows how to request, decode and check.
pub trait QuizQuestion: DeserializeOwned + JsonSchema + Into<GeneratedQuestion> {
    /// The kind this type represents.
    const KIND: QuestionKind;

    /// Check the invariants the schema alone cannot express.
    fn validate(&self) -> Result<(), ValidationError>;
}

impl QuizQuestion for McqQuestion {
    const KIND: QuestionKind = QuestionKind::Mcq;

    fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_mcq(self)
    }
}

impl QuizQuestion for FillBlankQuestion {
    const KIND: QuestionKind = QuestionKind::FillBlank;

    fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_fill_blank(self)
    }
}

/// A validated question as handed to the quiz session.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

impl From<McqQuestion> for GeneratedQuestion {
    fn from(q: McqQuestion) -> Self {
        Self {
            kind: QuestionKind::Mcq,
            question: q.question,
            options: Some(q.options),
            correct_answer: q.correct_answer,
        }
    }
}

impl From<FillBlankQuestion> for GeneratedQuestion {
    fn from(q: FillBlankQuestion) -> Self {
        Self {
            kind: QuestionKind::FillBlank,
            question: q.question,
            options: None,
            correct_answer: q.answer,
        }
    }
}
