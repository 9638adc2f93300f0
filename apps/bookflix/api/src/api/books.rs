use axum::Router;
use domain_books::{BookService, LlmReranker, RecommendationEngine, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let service = BookService::new(state.repository.clone(), state.queue.clone());
    let engine = RecommendationEngine::new(
        state.repository.clone(),
        state.embedder.clone(),
        LlmReranker::new(state.llm.clone()),
    );
    handlers::router(service, engine)
}
