//! Application state management.
//!
//! Everything here is shared by handlers, the ingestion worker and the
//! shutdown cleanup. All fields are cheap to clone.

use database::postgres::DatabaseConnection;
use domain_books::{EmbeddingQueue, GroqClient, PgBookRepository, VectorEmbedder};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: DatabaseConnection,
    pub repository: Arc<PgBookRepository>,
    /// The one embedding runtime, shared by ingestion and recommendations
    pub embedder: Arc<VectorEmbedder>,
    /// Producer side of the ingestion queue
    pub queue: EmbeddingQueue,
    pub llm: Arc<GroqClient>,
}
