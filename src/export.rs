//! CSV export of graded results.
//!
//! One row per question with the columns `question_number`, `question`,
//! `question_type`, `user_answer`, `correct_answer` and `is_correct`.

use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{QuizError, Result};
use crate::session::QuizResult;

pub const DEFAULT_PREFIX: &str = "quiz_results";

pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Serialize results as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, results: &[QuizResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(result)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize results into an in-memory CSV document, e.g. for a download.
pub fn to_csv_bytes(results: &[QuizResult]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, results)?;
    Ok(buf)
}

/// Read results back from CSV written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<QuizResult>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut results = Vec::new();
    for record in csv_reader.deserialize() {
        results.push(record?);
    }
    Ok(results)
}

/// `{prefix}_{YYYYmmdd_HHMMSS}.csv`
pub fn results_filename<Tz: TimeZone>(prefix: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.csv", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write results to a timestamped CSV file under `dir`, creating it if needed.
///
/// Returns the path written. An empty result list is rejected.
pub fn save_results(dir: impl AsRef<Path>, prefix: &str, results: &[QuizResult]) -> Result<PathBuf> {
    if results.is_empty() {
        return Err(QuizError::InvalidRequest("no results to save".into()));
    }
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(results_filename(prefix, &Local::now()));
    let file = fs::File::create(&path)?;
    write_csv(file, results)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::QuestionKind;
    use chrono::Utc;

    fn results() -> Vec<QuizResult> {
        vec![
            QuizResult {
                question_number: 1,
                question: "Which is the capital of France?".into(),
                question_type: QuestionKind::Mcq,
                user_answer: "Paris".into(),
                correct_answer: "Paris".into(),
                is_correct: true,
            },
            QuizResult {
                question_number: 2,
                question: "The Nile flows into the ___, \"mostly\".".into(),
                question_type: QuestionKind::FillBlank,
                user_answer: String::new(),
                correct_answer: "Mediterranean Sea".into(),
                is_correct: false,
            },
        ]
    }

    #[test]
    fn test_header_and_rows() {
        let bytes = to_csv_bytes(&results()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("question_number,question,question_type,user_answer,correct_answer,is_correct")
        );
        assert_eq!(
            lines.next(),
            Some("1,Which is the capital of France?,MCQ,Paris,Paris,true")
        );
    }

    #[test]
    fn test_round_trip_preserves_rows() {
        let original = results();
        let bytes = to_csv_bytes(&original).unwrap();
        let reloaded = read_csv(bytes.as_slice()).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_filename_carries_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(results_filename("quiz_results", &ts), "quiz_results_20240309_140507.csv");
    }

    #[test]
    fn test_save_writes_file_under_dir() {
        let dir = std::env::temp_dir().join(format!("quiz-pipeline-export-{}", std::process::id()));
        let path = save_results(&dir, DEFAULT_PREFIX, &results()).unwrap();
        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("quiz_results_") && name.ends_with(".csv"));

        let reloaded = read_csv(fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 2);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_rejects_empty_results() {
        let dir = std::env::temp_dir().join("quiz-pipeline-export-empty");
        assert!(matches!(
            save_results(&dir, DEFAULT_PREFIX, &[]),
            Err(QuizError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_malformed_csv_is_an_error() {
        let text = "question_number,question,question_type,user_answer,correct_answer,is_correct\n\
                    one,Q,MCQ,a,a,true\n";
        assert!(matches!(read_csv(text.as_bytes()), Err(QuizError::Csv(_))));
    }
}
