//! Example: a full quiz round against MockBackend, without a live LLM.
//!
//! Run with: `cargo run --example mock_quiz`

use quiz_pipeline::export::write_csv;
use quiz_pipeline::{
    Difficulty, LlmClient, MockBackend, QuestionGenerator, QuestionKind, QuizRequest, QuizSession,
    RetryConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The second reply has only three options and is rejected, so the
    // generator retries and takes the third.
    let mock = Arc::new(MockBackend::texts([
        r#"{"question": "Which planet is known as the Red Planet?", "options": ["Venus", "Mars", "Jupiter", "Saturn"], "correct_answer": "Mars"}"#,
        r#"{"question": "What is H2O?", "options": ["Water", "Salt", "Air"], "correct_answer": "Water"}"#,
        r#"{"question": "What is H2O commonly called?", "options": ["Water", "Salt", "Air", "Sand"], "correct_answer": "Water"}"#,
    ]));

    let client = LlmClient::builder("http://unused")
        .backend(mock.clone())
        .build()?;
    let generator = QuestionGenerator::new(client).with_retry(RetryConfig::new(3));

    let mut session = QuizSession::new();
    let request = QuizRequest::new(QuestionKind::Mcq, "General Science")
        .with_difficulty(Difficulty::Easy)
        .with_questions(2);
    session.generate_questions(&generator, &request).await?;
    println!("Generated {} questions with {} LLM calls", session.questions().len(), mock.calls());

    session.submit_answer(1, "mars")?;
    session.submit_answer(2, "Salt")?;
    session.evaluate();

    let score = session.score();
    println!("Score: {}/{} ({:.0}%)", score.correct, score.total, score.percentage);

    write_csv(std::io::stdout(), session.results())?;
    Ok(())
}
