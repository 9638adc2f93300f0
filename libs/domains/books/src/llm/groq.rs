use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatCompletion, ChatMessage};
use crate::error::{BookError, BookResult};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Low temperature keeps the id list stable across identical queries
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 150;

/// LLM provider configuration
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FromEnv for LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("GROQ_API_KEY")?,
            base_url: env_or_default("GROQ_BASE_URL", DEFAULT_BASE_URL),
            model: env_or_default("GROQ_LLM_MODEL", DEFAULT_MODEL),
            timeout: Duration::from_secs(env_parse("GROQ_TIMEOUT_SECS", 30u64)?),
        })
    }
}

/// Chat completions over the OpenAI-compatible REST API
pub struct GroqClient {
    client: Client,
    config: LlmConfig,
}

impl GroqClient {
    pub fn new(config: LlmConfig) -> BookResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BookError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// First choice's content, or `Provider` when the reply carries none
fn first_content(response: CompletionResponse) -> BookResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BookError::Provider("LLM response contained no message content".to_string()))
}

#[async_trait]
impl ChatCompletion for GroqClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> BookResult<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: &messages,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BookError::Provider(format!(
                "LLM provider returned {}: {}",
                status, body
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BookError::Provider(format!("Undecodable LLM response: {}", e)))?;

        first_content(body)
    }
}
