//! Quiz session: batch generation, answer collection and grading.
//!
//! A [`QuizSession`] holds one quiz attempt. Generating a new quiz replaces
//! everything; a failed generation leaves the session empty rather than
//! holding a partial quiz.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{QuizError, Result};
use crate::events::{emit, Event};
use crate::generator::QuestionGenerator;
use crate::schema::{Difficulty, GeneratedQuestion, QuestionKind};

/// Inclusive bounds on how many questions one quiz may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCountBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for QuestionCountBounds {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

impl QuestionCountBounds {
    pub fn contains(&self, n: usize) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub kind: QuestionKind,
    pub topic: String,
    pub difficulty: Difficulty,
    pub num_questions: usize,
}

impl QuizRequest {
    pub fn new(kind: QuestionKind, topic: impl Into<String>) -> Self {
        Self {
            kind,
            topic: topic.into(),
            difficulty: Difficulty::default(),
            num_questions: 5,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_questions(mut self, n: usize) -> Self {
        self.num_questions = n;
        self
    }
}

/// The graded outcome of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// 1-based position in the quiz.
    pub question_number: usize,
    pub question: String,
    pub question_type: QuestionKind,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Summary score over a result list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    /// 0.0 to 100.0; 0.0 for an empty quiz.
    pub percentage: f64,
}

impl QuizScore {
    pub fn from_results(results: &[QuizResult]) -> Self {
        let total = results.len();
        let correct = results.iter().filter(|r| r.is_correct).count();
        let percentage = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        Self {
            correct,
            total,
            percentage,
        }
    }
}

/// Case-insensitive comparison after trimming both sides.
pub fn answers_match(user_answer: &str, correct_answer: &str) -> bool {
    user_answer.trim().to_lowercase() == correct_answer.trim().to_lowercase()
}

/// Grade `questions` against `answers`, keyed by 1-based question number.
///
/// A missing answer counts as empty text.
pub fn evaluate(questions: &[GeneratedQuestion], answers: &HashMap<usize, String>) -> Vec<QuizResult> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let number = i + 1;
            let user_answer = answers.get(&number).map(|a| a.trim()).unwrap_or("");
            let correct_answer = q.correct_answer.trim();
            QuizResult {
                question_number: number,
                question: q.question.clone(),
                question_type: q.kind,
                user_answer: user_answer.to_string(),
                correct_answer: correct_answer.to_string(),
                is_correct: answers_match(user_answer, correct_answer),
            }
        })
        .collect()
}

/// One quiz attempt.
#[derive(Debug, Default)]
pub struct QuizSession {
    bounds: QuestionCountBounds,
    questions: Vec<GeneratedQuestion>,
    answers: HashMap<usize, String>,
    results: Vec<QuizResult>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: QuestionCountBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> QuestionCountBounds {
        self.bounds
    }

    /// Generate a full quiz, all or nothing.
    ///
    /// Clears the session first. Questions are generated one at a time; if
    /// any of them fails, the questions generated so far are discarded and
    /// the error is returned.
    pub async fn generate_questions(
        &mut self,
        generator: &QuestionGenerator,
        request: &QuizRequest,
    ) -> Result<()> {
        self.reset();

        if !self.bounds.contains(request.num_questions) {
            return Err(QuizError::InvalidRequest(format!(
                "number of questions must be between {} and {}, got {}",
                self.bounds.min, self.bounds.max, request.num_questions
            )));
        }

        let events = generator.event_handler();
        emit(
            events,
            Event::BatchStart {
                kind: request.kind,
                topic: request.topic.trim().to_string(),
                difficulty: request.difficulty,
                num_questions: request.num_questions,
            },
        );

        let mut questions = Vec::with_capacity(request.num_questions);
        for _ in 0..request.num_questions {
            match generator
                .generate(request.kind, &request.topic, request.difficulty)
                .await
            {
                Ok(q) => questions.push(q),
                Err(e) => {
                    emit(
                        events,
                        Event::BatchEnd {
                            generated: questions.len(),
                            ok: false,
                        },
                    );
                    return Err(e);
                }
            }
        }

        emit(
            events,
            Event::BatchEnd {
                generated: questions.len(),
                ok: true,
            },
        );
        self.questions = questions;
        Ok(())
    }

    /// Replace the session's questions directly, e.g. from a saved quiz.
    pub fn load_questions(&mut self, questions: Vec<GeneratedQuestion>) {
        self.reset();
        self.questions = questions;
    }

    pub fn questions(&self) -> &[GeneratedQuestion] {
        &self.questions
    }

    pub fn is_generated(&self) -> bool {
        !self.questions.is_empty()
    }

    /// Record the answer for a 1-based question number, replacing any earlier one.
    pub fn submit_answer(&mut self, question_number: usize, answer: impl Into<String>) -> Result<()> {
        if question_number == 0 || question_number > self.questions.len() {
            return Err(QuizError::InvalidRequest(format!(
                "question number {} is out of range 1..={}",
                question_number,
                self.questions.len()
            )));
        }
        self.answers.insert(question_number, answer.into());
        Ok(())
    }

    pub fn answers(&self) -> &HashMap<usize, String> {
        &self.answers
    }

    /// Grade every question and keep the results.
    pub fn evaluate(&mut self) -> &[QuizResult] {
        self.results = evaluate(&self.questions, &self.answers);
        &self.results
    }

    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    pub fn is_submitted(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn score(&self) -> QuizScore {
        QuizScore::from_results(&self.results)
    }

    fn reset(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.results.clear();
    }
}
