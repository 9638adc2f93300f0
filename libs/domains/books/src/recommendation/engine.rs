use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::parser::parse_reply;
use crate::embedding::Embedder;
use crate::error::BookResult;
use crate::llm::LlmReranker;
use crate::models::{Book, CandidateBook, RecommendationQuery, RecommendationResult, RecommendedBook};
use crate::repository::BookRepository;

/// Upper bound on books in a recommendation, whatever the model returns
pub const MAX_RECOMMENDATIONS: usize = 2;

pub const NO_MATCH_MESSAGE: &str = "Sorry, we currently cannot recommend any Book for your query. \
Please make sure that the query is related to Book recommendation and try to be specific.";

pub const MATCH_MESSAGE: &str =
    "Here are the recommended Books based on your query among our available Books.";

/// Query → embedding → similar books → LLM rerank → validated result.
///
/// Holds no per-request state. The query is embedded directly, not through the
/// ingestion queue, but still shares the embedder's lock with it.
pub struct RecommendationEngine<R: BookRepository> {
    repository: Arc<R>,
    embedder: Arc<dyn Embedder>,
    reranker: LlmReranker,
}

impl<R: BookRepository> RecommendationEngine<R> {
    pub fn new(repository: Arc<R>, embedder: Arc<dyn Embedder>, reranker: LlmReranker) -> Self {
        Self {
            repository,
            embedder,
            reranker,
        }
    }

    pub async fn recommend(&self, query: &RecommendationQuery) -> BookResult<RecommendationResult> {
        let started = Instant::now();

        let embedding = self.embedder.embed(&query.query).await?;
        let similar = self.repository.find_similar(&embedding).await?;
        let candidates: Vec<CandidateBook> = similar.iter().map(CandidateBook::from).collect();

        let reply = self.reranker
            .rerank(&query.query, &candidates, query.explanation_needed)
            .await?;
        let parsed = parse_reply(&reply, query.explanation_needed)?;

        let books = select(&similar, &parsed.ids);

        tracing::info!(
            candidates = similar.len(),
            returned_ids = parsed.ids.len(),
            recommended = books.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation built"
        );

        let message = if books.is_empty() {
            NO_MATCH_MESSAGE
        } else {
            MATCH_MESSAGE
        };

        Ok(RecommendationResult {
            message: message.to_string(),
            books,
            explanation: if query.explanation_needed {
                parsed.reasoning
            } else {
                None
            },
        })
    }
}

/// Candidates the model picked, in similarity order, capped at [`MAX_RECOMMENDATIONS`].
/// Ids that were never offered are dropped.
fn select(similar: &[Book], picked: &[Uuid]) -> Vec<RecommendedBook> {
    let picked: HashSet<&Uuid> = picked.iter().collect();
    let offered: HashSet<Uuid> = similar.iter().map(|b| b.id).collect();

    let fabricated = picked.iter().filter(|id| !offered.contains(id)).count();
    if fabricated > 0 {
        tracing::warn!(fabricated, "LLM returned ids outside the candidate set");
    }

    let mut seen = HashSet::new();
    similar
        .iter()
        .filter(|b| picked.contains(&b.id) && seen.insert(b.id))
        .take(MAX_RECOMMENDATIONS)
        .map(RecommendedBook::from)
        .collect()
}
