//! One chat-completion call against an OpenAI-compatible provider (Groq by default).

mod groq;
pub mod prompts;
mod reranker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BookResult;

pub use groq::{GroqClient, LlmConfig};
pub use reranker::LlmReranker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A single request/response chat completion returning the first choice's text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> BookResult<String>;
}
