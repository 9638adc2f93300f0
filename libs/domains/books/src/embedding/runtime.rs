use crate::error::BookResult;

/// A synchronous, non-reentrant text embedding model.
///
/// Implementations are only ever called by [`VectorEmbedder`](super::VectorEmbedder),
/// one call at a time, on the blocking thread pool.
pub trait EmbeddingRuntime: Send {
    fn embed(&mut self, text: &str) -> BookResult<Vec<f32>>;
}

#[cfg(feature = "fastembed")]
pub use self::onnx::FastEmbedRuntime;

#[cfg(feature = "fastembed")]
mod onnx {
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

    use super::EmbeddingRuntime;
    use crate::embedding::EmbeddingConfig;
    use crate::error::{BookError, BookResult};

    /// ONNX runtime hosting a sentence-transformer model through `fastembed`
    pub struct FastEmbedRuntime {
        model: TextEmbedding,
    }

    impl FastEmbedRuntime {
        /// Loads the model, downloading it into the cache directory on first use
        pub fn try_new(config: &EmbeddingConfig) -> BookResult<Self> {
            let model = match config.model.as_str() {
                "all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
                "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
                other => {
                    return Err(BookError::Config(format!(
                        "Unsupported EMBEDDING_MODEL '{}', expected a 384-dimension model",
                        other
                    )));
                }
            };

            tracing::info!(
                model = %config.model,
                cache_dir = %config.cache_dir.display(),
                "Loading embedding model"
            );

            let options = InitOptions::new(model)
                .with_cache_dir(config.cache_dir.clone())
                .with_show_download_progress(false);

            let model = TextEmbedding::try_new(options)
                .map_err(|e| BookError::Provider(format!("Failed to load embedding model: {}", e)))?;

            Ok(Self { model })
        }
    }

    impl EmbeddingRuntime for FastEmbedRuntime {
        fn embed(&mut self, text: &str) -> BookResult<Vec<f32>> {
            let mut batch = self
                .model
                .embed(vec![text], None)
                .map_err(|e| BookError::Provider(format!("Embedding failed: {}", e)))?;

            batch
                .pop()
                .ok_or_else(|| BookError::Provider("Embedding runtime returned no vector".to_string()))
        }
    }
}
