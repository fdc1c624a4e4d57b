//! Retry policy for question generation.
//!
//! [`RetryConfig`] bounds how many times the
//! [`QuestionGenerator`](crate::generator::QuestionGenerator) runs the
//! build → call → parse → validate cycle for one question. Attempts are
//! immediate; there is no backoff.

/// Upper bound on attempts per question.
pub const MAX_ATTEMPTS_CAP: u32 = 10;

/// Bounded retry policy for one question.
///
/// # Example
///
/// ```
/// use quiz_pipeline::retry::RetryConfig;
///
/// let config = RetryConfig::new(3);
/// assert_eq!(config.max_attempts, 3);
/// assert!(config.should_retry(2));
/// assert!(!config.should_retry(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first, in `1..=10`.
    pub max_attempts: u32,
}

impl RetryConfig {
    /// Allow up to `max_attempts` attempts, clamped to `1..=10`.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS_CAP),
        }
    }

    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self::new(1)
    }

    /// Whether another attempt is allowed after `attempts_made` failures.
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}
