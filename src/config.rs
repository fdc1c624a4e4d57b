//! Runtime configuration from the environment.
//!
//! [`QuizConfig::from_env`] reads a `.env` file if one exists (via
//! `dotenvy`) and then the process environment. Every setting except the
//! API key has a default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::OpenAiBackend;
use crate::client::{LlmClient, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::error::{QuizError, Result};
use crate::export::DEFAULT_RESULTS_DIR;
use crate::retry::{RetryConfig, MAX_ATTEMPTS_CAP};
use crate::session::QuestionCountBounds;

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Settings consumed by the binary and by [`QuizConfig::build_client`].
#[derive(Clone)]
pub struct QuizConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub json_mode: bool,
    /// Total attempts per question, in `1..=10`.
    pub max_retries: u32,
    pub timeout: Duration,
    pub max_questions: usize,
    pub results_dir: PathBuf,
    /// Where the binary writes one log file per run.
    pub log_dir: PathBuf,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: LlmConfig::default().temperature,
            json_mode: true,
            max_retries: 3,
            timeout: DEFAULT_TIMEOUT,
            max_questions: QuestionCountBounds::default().max,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl std::fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("json_mode", &self.json_mode)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("max_questions", &self.max_questions)
            .field("results_dir", &self.results_dir)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl QuizConfig {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(QuizError::InvalidConfig(format!("failed to load .env: {}", e)));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let config = Self {
            api_key: get("GROQ_API_KEY"),
            base_url: get("LLM_BASE_URL").unwrap_or(defaults.base_url),
            model: get("LLM_MODEL").unwrap_or(defaults.model),
            temperature: parse_or(get("LLM_TEMPERATURE"), "LLM_TEMPERATURE", defaults.temperature)?,
            json_mode: parse_or(get("LLM_JSON_MODE"), "LLM_JSON_MODE", defaults.json_mode)?,
            max_retries: parse_or(get("MAX_RETRIES"), "MAX_RETRIES", defaults.max_retries)?,
            timeout: Duration::from_secs(parse_or(
                get("LLM_TIMEOUT_SECS"),
                "LLM_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            max_questions: parse_or(get("QUIZ_MAX_QUESTIONS"), "QUIZ_MAX_QUESTIONS", defaults.max_questions)?,
            results_dir: get("RESULTS_DIR").map(PathBuf::from).unwrap_or(defaults.results_dir),
            log_dir: get("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ATTEMPTS_CAP).contains(&self.max_retries) {
            return Err(QuizError::InvalidConfig(format!(
                "MAX_RETRIES must be within 1..={}, got {}",
                MAX_ATTEMPTS_CAP, self.max_retries
            )));
        }
        if self.timeout.is_zero() {
            return Err(QuizError::InvalidConfig("LLM_TIMEOUT_SECS must be at least 1".into()));
        }
        if self.max_questions == 0 {
            return Err(QuizError::InvalidConfig("QUIZ_MAX_QUESTIONS must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(QuizError::InvalidConfig(format!(
                "LLM_TEMPERATURE must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.max_retries)
    }

    pub fn question_bounds(&self) -> QuestionCountBounds {
        QuestionCountBounds {
            min: 1,
            max: self.max_questions,
        }
    }

    /// Build the HTTP-backed client. Requires an API key.
    pub fn build_client(&self) -> Result<LlmClient> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| QuizError::InvalidConfig("GROQ_API_KEY is not set".into()))?;
        LlmClient::builder(&self.base_url)
            .backend(Arc::new(OpenAiBackend::new().with_api_key(api_key)))
            .model(&self.model)
            .config(
                LlmConfig::default()
                    .with_temperature(self.temperature)
                    .with_json_mode(self.json_mode),
            )
            .timeout(self.timeout)
            .build()
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| QuizError::InvalidConfig(format!("{} = '{}': {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = QuizConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_config().max_attempts, 3);
        assert_eq!(config.question_bounds(), QuestionCountBounds { min: 1, max: 10 });
        assert!(config.api_key.is_none());
        assert!(config.json_mode);
        assert_eq!(config.log_dir, PathBuf::from(DEFAULT_LOG_DIR));
    }

    #[test]
    fn test_reads_overrides() {
        let config = QuizConfig::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("LLM_MODEL", "llama-3.3-70b-versatile"),
            ("MAX_RETRIES", "5"),
            ("LLM_TIMEOUT_SECS", "15"),
            ("QUIZ_MAX_QUESTIONS", "20"),
            ("LLM_JSON_MODE", "false"),
            ("RESULTS_DIR", "/tmp/quiz"),
            ("LOG_DIR", "/tmp/quiz-logs"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_questions, 20);
        assert!(!config.json_mode);
        assert_eq!(config.results_dir, PathBuf::from("/tmp/quiz"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/quiz-logs"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = QuizConfig::from_lookup(lookup(&[("MAX_RETRIES", "  ")])).unwrap();
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = QuizConfig::from_lookup(lookup(&[("MAX_RETRIES", "0")])).unwrap_err();
        assert!(matches!(err, QuizError::InvalidConfig(_)));
    }

    #[test]
    fn test_retries_above_cap_rejected() {
        let err = QuizConfig::from_lookup(lookup(&[("MAX_RETRIES", "11")])).unwrap_err();
        assert!(matches!(err, QuizError::InvalidConfig(_)));
        assert!(err.to_string().contains("1..=10"));

        let config = QuizConfig::from_lookup(lookup(&[("MAX_RETRIES", "10")])).unwrap();
        assert_eq!(config.retry_config().max_attempts, 10);
    }

    #[tokio::test]
    async fn test_configured_retries_are_honoured() {
        use crate::backend::MockBackend;
        use crate::generator::QuestionGenerator;
        use crate::schema::Difficulty;

        let config = QuizConfig::from_lookup(lookup(&[("MAX_RETRIES", "7")])).unwrap();
        let mock = Arc::new(MockBackend::fixed("no json here"));
        let client = LlmClient::builder("http://mock").backend(mock.clone()).build().unwrap();
        let generator = QuestionGenerator::new(client).with_retry(config.retry_config());

        let err = generator.generate_mcq("Rust", Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, QuizError::GenerationExhausted { attempts: 7, .. }));
        assert_eq!(mock.calls(), 7);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = QuizConfig::from_lookup(lookup(&[("LLM_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("LLM_TIMEOUT_SECS"));
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = QuizConfig::default();
        assert!(matches!(config.build_client(), Err(QuizError::InvalidConfig(_))));

        let config = QuizConfig {
            api_key: Some("gsk_test".into()),
            ..QuizConfig::default()
        };
        let client = config.build_client().unwrap();
        assert_eq!(client.backend_name(), "openai");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = QuizConfig {
            api_key: Some("gsk_secret".into()),
            ..QuizConfig::default()
        };
        assert!(!format!("{:?}", config).contains("gsk_secret"));
    }
}
