use std::sync::Arc;

use super::{ChatCompletion, ChatMessage, prompts};
use crate::error::{BookError, BookResult};
use crate::models::CandidateBook;

/// Asks the model to pick at most two of the candidates for a query
#[derive(Clone)]
pub struct LlmReranker {
    client: Arc<dyn ChatCompletion>,
}

impl LlmReranker {
    pub fn new(client: Arc<dyn ChatCompletion>) -> Self {
        Self { client }
    }

    /// Returns the raw reply; interpreting it is the caller's job.
    ///
    /// Reasoning is only requested from the model when `explanation_needed` is set.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: &[CandidateBook],
        explanation_needed: bool,
    ) -> BookResult<String> {
        let books_json = serde_json::to_string(candidates)
            .map_err(|e| BookError::Internal(format!("Failed to serialize candidates: {}", e)))?;

        let messages = vec![
            ChatMessage::system(prompts::system_prompt(explanation_needed)),
            ChatMessage::user(prompts::user_message(query, &books_json)),
        ];

        tracing::debug!(
            candidates = candidates.len(),
            explanation_needed,
            "Requesting rerank"
        );
        self.client.complete(messages).await
    }
}
