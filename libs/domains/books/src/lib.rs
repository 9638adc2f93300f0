//! Books Domain
//!
//! Book catalog with semantic recommendations.
//!
//! # Architecture
//!
//! ```text
//!  write path                              read path
//! ┌─────────────┐                        ┌──────────────────────┐
//! │  Handlers   │                        │      Handlers        │
//! └──────┬──────┘                        └──────────┬───────────┘
//! ┌──────▼──────┐  on_book_written       ┌──────────▼───────────┐
//! │ BookService │ ──────────────┐        │ RecommendationEngine │
//! └──────┬──────┘               │        └──┬───────┬────────┬──┘
//!        │              ┌───────▼──────┐    │       │        │
//!        │              │EmbeddingQueue│    │       │        │
//!        │              └───────┬──────┘    │       │        │
//!        │              ┌───────▼──────┐ ┌──▼──────┐│  ┌─────▼──────┐
//!        │              │   Worker     ├─► Embedder││  │ LlmReranker│
//!        │              └───────┬──────┘ └─────────┘│  └────────────┘
//! ┌──────▼──────────────────────▼───────────────────▼──┐
//! │           BookRepository (Postgres + pgvector)      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_books::{
//!     BookService, EmbeddingQueue, EmbeddingWorker, GroqClient, LlmConfig, LlmReranker,
//!     PgBookRepository, RecommendationEngine, VectorEmbedder, embedding::EmbeddingConfig,
//!     handlers,
//! };
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//! let repository = Arc::new(PgBookRepository::new(db));
//! let embedder = Arc::new(VectorEmbedder::from_config(&EmbeddingConfig::default())?);
//!
//! let (queue, rx) = EmbeddingQueue::new();
//! EmbeddingWorker::new(rx, queue.clone(), embedder.clone(), repository.clone()).spawn();
//!
//! let reranker = LlmReranker::new(Arc::new(GroqClient::new(LlmConfig::new("gsk_..."))?));
//! let service = BookService::new(repository.clone(), queue);
//! let engine = RecommendationEngine::new(repository, embedder, reranker);
//!
//! let router = handlers::router(service, engine);
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod ingestion;
pub mod llm;
pub mod models;
pub mod postgres;
pub mod recommendation;
pub mod reference;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use embedding::{Embedder, Embedding, VectorEmbedder};
pub use error::{BookError, BookResult};
pub use ingestion::{EmbeddingQueue, EmbeddingWorker, QueueState};
pub use llm::{GroqClient, LlmConfig, LlmReranker};
pub use models::{
    Book, CreateBook, CreateBooks, RecommendationQuery, RecommendationResult, RecommendedBook,
    UpdateBook,
};
pub use postgres::PgBookRepository;
pub use recommendation::RecommendationEngine;
pub use repository::{BookRepository, InMemoryBookRepository};
pub use service::BookService;
