use std::fmt::Display;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, TimeZone};
use quiz_pipeline::export::{save_results, DEFAULT_PREFIX};
use quiz_pipeline::{
    Difficulty, LogEventHandler, QuestionKind, QuestionGenerator, QuizConfig, QuizRequest,
    QuizSession,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = QuizConfig::from_env().context("failed to load configuration")?;
    let log_path = init_logging(&config.log_dir)?;
    log::info!("Logging to {}", log_path.display());
    log::debug!("{:?}", config);

    let client = config.build_client().context("failed to build LLM client")?;
    let generator = QuestionGenerator::new(client)
        .with_retry(config.retry_config())
        .with_event_handler(Arc::new(LogEventHandler::default()));

    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("LLM Quiz Generator");
    println!();

    let kind: QuestionKind = ask_parsed(&mut input, "Question format [mcq / fill-blank]", QuestionKind::Mcq)?;
    let topic = loop {
        let topic = ask(&mut input, "Topic")?;
        if !topic.is_empty() {
            break topic;
        }
        println!("Please enter a topic.");
    };
    let difficulty: Difficulty = ask_parsed(&mut input, "Difficulty [easy / medium / hard]", Difficulty::Medium)?;

    let bounds = config.question_bounds();
    let num_questions = loop {
        let n: usize = ask_parsed(
            &mut input,
            &format!("Number of questions [{}-{}]", bounds.min, bounds.max),
            5usize.clamp(bounds.min, bounds.max),
        )?;
        if bounds.contains(n) {
            break n;
        }
        println!("Please choose between {} and {}.", bounds.min, bounds.max);
    };

    let request = QuizRequest::new(kind, topic)
        .with_difficulty(difficulty)
        .with_questions(num_questions);
    let mut session = QuizSession::with_bounds(bounds);

    println!();
    println!("Generating {} {} questions...", num_questions, kind);
    session
        .generate_questions(&generator, &request)
        .await
        .context("quiz generation failed")?;

    let questions = session.questions().to_vec();
    for (i, question) in questions.iter().enumerate() {
        let number = i + 1;
        println!();
        println!("Q{}. {}", number, question.question);
        let answer = match &question.options {
            Some(options) => {
                for (j, option) in options.iter().enumerate() {
                    println!("  {}. {}", j + 1, option);
                }
                let raw = ask(&mut input, "Your answer (number or text)")?;
                resolve_choice(&raw, options)
            }
            None => ask(&mut input, "Your answer")?,
        };
        session
            .submit_answer(number, answer)
            .with_context(|| format!("failed to record answer for question {}", number))?;
    }

    session.evaluate();
    let score = session.score();

    println!();
    println!(
        "Score: {}/{} ({:.1}%)",
        score.correct, score.total, score.percentage
    );
    for result in session.results() {
        if result.is_correct {
            println!("  Q{}: correct", result.question_number);
        } else {
            let given = if result.user_answer.is_empty() {
                "(no answer)"
            } else {
                result.user_answer.as_str()
            };
            println!(
                "  Q{}: incorrect, you said '{}', correct answer is '{}'",
                result.question_number, given, result.correct_answer
            );
        }
    }

    println!();
    let save = ask(&mut input, "Save results to CSV? [y/N]")?;
    if matches!(save.to_lowercase().as_str(), "y" | "yes") {
        let path = save_results(&config.results_dir, DEFAULT_PREFIX, session.results())
            .with_context(|| format!("failed to save results under {}", config.results_dir.display()))?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}

/// Send all log output for this run to a fresh timestamped file under `dir`.
fn init_logging(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join(log_filename(&Local::now()));
    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "{}", log_line(&Local::now(), record.level(), record.args()))
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(path)
}

/// `log_{yy-mm-dd_HH-MM-SS}.log`
fn log_filename<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("log_{}.log", timestamp.format("%y-%m-%d_%H-%M-%S"))
}

/// `time - LEVEL - message`
fn log_line<Tz: TimeZone>(timestamp: &DateTime<Tz>, level: log::Level, message: impl Display) -> String
where
    Tz::Offset: Display,
{
    format!("{} - {} - {}", timestamp.format("%Y-%m-%d %H:%M:%S,%3f"), level, message)
}

/// Print `label`, read one trimmed line.
fn ask(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read stdin")?;
    if read == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

/// Ask until the answer parses; a blank line takes `default`.
fn ask_parsed<T>(input: &mut impl BufRead, label: &str, default: T) -> Result<T>
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    loop {
        let raw = ask(input, &format!("{} (default {})", label, default))?;
        if raw.is_empty() {
            return Ok(default);
        }
        match raw.parse() {
            Ok(value) => return Ok(value),
            Err(e) => println!("{}", e),
        }
    }
}

/// Map a 1-based option number to its text; anything else is taken as typed.
fn resolve_choice(raw: &str, options: &[String]) -> String {
    match raw.trim().parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].clone(),
        _ => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        ["Paris", "Rome", "Madrid", "Berlin"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_number_selects_option() {
        assert_eq!(resolve_choice("2", &options()), "Rome");
        assert_eq!(resolve_choice(" 4 ", &options()), "Berlin");
    }

    #[test]
    fn test_out_of_range_number_is_kept_verbatim() {
        assert_eq!(resolve_choice("7", &options()), "7");
    }

    #[test]
    fn test_text_answer_passes_through() {
        assert_eq!(resolve_choice(" paris ", &options()), "paris");
    }

    #[test]
    fn test_ask_parsed_uses_default_on_blank() {
        let mut input = io::Cursor::new("\n");
        let d: Difficulty = ask_parsed(&mut input, "Difficulty", Difficulty::Hard).unwrap();
        assert_eq!(d, Difficulty::Hard);
    }

    #[test]
    fn test_ask_parsed_retries_until_valid() {
        let mut input = io::Cursor::new("extreme\neasy\n");
        let d: Difficulty = ask_parsed(&mut input, "Difficulty", Difficulty::Medium).unwrap();
        assert_eq!(d, Difficulty::Easy);
    }

    #[test]
    fn test_ask_fails_on_closed_input() {
        let mut input = io::Cursor::new("");
        assert!(ask(&mut input, "Topic").is_err());
    }

    #[test]
    fn test_log_filename_carries_run_timestamp() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(log_filename(&ts), "log_24-03-09_14-05-07.log");
    }

    #[test]
    fn test_log_line_layout() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            log_line(&ts, log::Level::Warn, "attempt 1 failed"),
            "2024-03-09 14:05:07,000 - WARN - attempt 1 failed"
        );
    }
}
