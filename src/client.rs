//! LLM client adapter: one prompt in, one completion text out.
//!
//! [`LlmClient`] carries the HTTP client, backend, endpoint, model and
//! sampling settings. It is built once and handed to the
//! [`QuestionGenerator`](crate::generator::QuestionGenerator).

use crate::backend::{Backend, LlmRequest, OpenAiBackend};
use crate::error::{QuizError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling configuration for LLM requests.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Ask the provider for a JSON object response.
    pub json_mode: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
            json_mode: false,
        }
    }
}

impl LlmConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }
}

/// Adapter over a [`Backend`]: one backend call per prompt.
///
/// # Example
///
/// ```
/// use quiz_pipeline::client::LlmClient;
/// use quiz_pipeline::backend::OpenAiBackend;
/// use std::sync::Arc;
///
/// let client = LlmClient::builder("https://api.groq.com/openai/v1")
///     .backend(Arc::new(OpenAiBackend::new().with_api_key("gsk_...")))
///     .model("llama-3.1-8b-instant")
///     .build()
///     .unwrap();
/// assert_eq!(client.base_url(), "https://api.groq.com/openai");
/// ```
pub struct LlmClient {
    http: Client,
    base_url: String,
    backend: Arc<dyn Backend>,
    model: String,
    system_prompt: Option<String>,
    config: LlmConfig,
    timeout: Duration,
}

impl LlmClient {
    pub fn builder(base_url: impl Into<String>) -> LlmClientBuilder {
        LlmClientBuilder {
            client: None,
            base_url: base_url.into(),
            backend: None,
            model: None,
            system_prompt: None,
            config: LlmConfig::default(),
            timeout: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Send one prompt and return the raw completion text.
    ///
    /// Makes exactly one backend call. Transport failures, non-success
    /// statuses, the per-call timeout and empty completions are all errors.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = LlmRequest {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            prompt: prompt.to_string(),
            config: self.config.clone(),
        };

        let call = self.backend.complete(&self.http, &self.base_url, &request);
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| QuizError::Timeout(self.timeout))??;

        if response.text.trim().is_empty() {
            return Err(QuizError::EmptyResponse);
        }
        Ok(response.text)
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`LlmClient`].
pub struct LlmClientBuilder {
    client: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    model: Option<String>,
    system_prompt: Option<String>,
    config: LlmConfig,
    timeout: Option<Duration>,
}

impl LlmClientBuilder {
    /// Set the HTTP client. If not set, one is built with the configured timeout.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the LLM backend. Default: [`OpenAiBackend`] without a key.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the OpenAI-compatible backend with API key authentication.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(OpenAiBackend::new().with_api_key(api_key)));
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-call timeout. Default: 60 seconds.
    ///
    /// Always enforced around the backend call. Also applied to the HTTP
    /// client unless a custom one was supplied via [`client`](Self::client).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<LlmClient> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(QuizError::InvalidConfig("timeout must be non-zero".into()));
        }
        let http = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| QuizError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?,
        };
        Ok(LlmClient {
            http,
            base_url: normalize_base_url(&self.base_url),
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(OpenAiBackend::new())),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system_prompt: self.system_prompt,
            config: self.config,
            timeout,
        })
    }
}

/// Strip known provider path suffixes from a base URL.
/// Backends append their own paths, e.g. `/v1/chat/completions`.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for suffix in ["/v1/chat/completions", "/v1/chat", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}
