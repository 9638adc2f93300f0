use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;

use super::{Embedder, Embedding, EmbeddingRuntime};
use crate::error::{BookError, BookResult};

/// Serializes every call into an [`EmbeddingRuntime`].
///
/// The runtime is not reentrant, so it lives behind one `tokio::sync::Mutex`. A
/// caller waits for the lock asynchronously, then the actual inference runs on
/// the blocking pool while the guard is held. Cloning shares the same runtime.
#[derive(Clone)]
pub struct VectorEmbedder {
    runtime: Arc<Mutex<Box<dyn EmbeddingRuntime>>>,
    in_flight: Arc<AtomicUsize>,
}

impl VectorEmbedder {
    pub fn new(runtime: Box<dyn EmbeddingRuntime>) -> Self {
        Self {
            runtime: Arc::new(Mutex::new(runtime)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Loads the configured fastembed model
    #[cfg(feature = "fastembed")]
    pub fn from_config(config: &super::EmbeddingConfig) -> BookResult<Self> {
        let runtime = super::FastEmbedRuntime::try_new(config)?;
        Ok(Self::new(Box::new(runtime)))
    }

    /// Calls currently executing inside the runtime; never more than 1
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// One throwaway embedding so model load and graph init happen before traffic
    pub async fn warm_up(&self) -> BookResult<()> {
        let started = Instant::now();
        self.embed("warmup").await?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Embedding model warmed up"
        );
        Ok(())
    }
}

/// Counts a call as in flight until dropped, including on unwind
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Embedder for VectorEmbedder {
    async fn embed(&self, text: &str) -> BookResult<Embedding> {
        let mut guard = self.runtime.clone().lock_owned().await;
        let in_flight = self.in_flight.clone();
        let text = text.to_owned();

        let values = tokio::task::spawn_blocking(move || {
            let _entered = InFlight::enter(in_flight);
            guard.embed(&text)
        })
        .await
        .map_err(|e| BookError::Provider(format!("Embedding task failed: {}", e)))??;

        Embedding::try_from(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EMBEDDING_DIMENSION;
    use std::time::Duration;

    struct CountingRuntime {
        active: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
        len: usize,
    }

    impl EmbeddingRuntime for CountingRuntime {
        fn embed(&mut self, _text: &str) -> BookResult<Vec<f32>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![0.1; self.len])
        }
    }

    fn embedder(len: usize) -> (VectorEmbedder, Arc<AtomicUsize>) {
        let max_seen = Arc::new(AtomicUsize::new(0));
        let runtime = CountingRuntime {
            active: Arc::new(AtomicUsize::new(0)),
            max_seen: max_seen.clone(),
            len,
        };
        (VectorEmbedder::new(Box::new(runtime)), max_seen)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_never_overlap() {
        let (embedder, max_seen) = embedder(EMBEDDING_DIMENSION);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let embedder = embedder.clone();
                tokio::spawn(async move { embedder.embed(&format!("text {}", i)).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(embedder.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_wrong_length_is_shape_error() {
        let (embedder, _) = embedder(300);
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(
            err,
            BookError::EmbeddingShape {
                expected: 384,
                actual: 300
            }
        ));
    }

    #[tokio::test]
    async fn test_panicking_runtime_is_provider_error() {
        struct Panics;
        impl EmbeddingRuntime for Panics {
            fn embed(&mut self, _text: &str) -> BookResult<Vec<f32>> {
                panic!("onnx blew up")
            }
        }

        let embedder = VectorEmbedder::new(Box::new(Panics));
        assert!(matches!(
            embedder.embed("x").await,
            Err(BookError::Provider(_))
        ));
        assert_eq!(embedder.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_warm_up_uses_runtime() {
        let (embedder, max_seen) = embedder(EMBEDDING_DIMENSION);
        embedder.warm_up().await.unwrap();
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
