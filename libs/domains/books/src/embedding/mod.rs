//! Text → 384-dimension vectors.
//!
//! [`VectorEmbedder`] owns the model runtime behind a single async mutex; every
//! caller (the ingestion worker and recommendation requests) goes through it.

mod embedder;
mod runtime;
mod vector;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default};
use std::path::PathBuf;

use crate::error::BookResult;

pub use embedder::VectorEmbedder;
pub use runtime::EmbeddingRuntime;
#[cfg(feature = "fastembed")]
pub use runtime::FastEmbedRuntime;
pub use vector::{EMBEDDING_DIMENSION, Embedding};

/// Anything that turns text into an [`Embedding`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> BookResult<Embedding>;
}

/// Embedding model selection
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub model: String,
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            cache_dir: PathBuf::from(".fastembed_cache"),
        }
    }
}

impl FromEnv for EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            model: env_or_default("EMBEDDING_MODEL", "all-MiniLM-L6-v2"),
            cache_dir: PathBuf::from(env_or_default("EMBEDDING_CACHE_DIR", ".fastembed_cache")),
        })
    }
}
