use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{EmbeddingQueue, EmbeddingTask, QueueState};
use crate::embedding::Embedder;
use crate::error::BookResult;
use crate::repository::BookRepository;

/// The single consumer of an [`EmbeddingQueue`].
///
/// Runs until the queue is closed. A task already being processed is finished;
/// anything still queued at that point is abandoned.
pub struct EmbeddingWorker<R: BookRepository> {
    rx: mpsc::UnboundedReceiver<EmbeddingTask>,
    queue: EmbeddingQueue,
    embedder: Arc<dyn Embedder>,
    repository: Arc<R>,
}

impl<R: BookRepository + 'static> EmbeddingWorker<R> {
    pub fn new(
        rx: mpsc::UnboundedReceiver<EmbeddingTask>,
        queue: EmbeddingQueue,
        embedder: Arc<dyn Embedder>,
        repository: Arc<R>,
    ) -> Self {
        Self {
            rx,
            queue,
            embedder,
            repository,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        let mut state = self.queue.subscribe();
        tracing::info!("Embedding worker started");

        loop {
            let task = tokio::select! {
                biased;
                _ = state.wait_for(|s| *s != QueueState::Open) => break,
                task = self.rx.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
            };

            self.queue.task_taken();
            self.process(task).await;
        }

        self.rx.close();
        let mut abandoned = 0usize;
        while self.rx.try_recv().is_ok() {
            self.queue.task_taken();
            abandoned += 1;
        }
        self.queue.mark_closed();

        if abandoned > 0 {
            tracing::warn!(abandoned, "Embedding worker stopped, pending tasks abandoned");
        } else {
            tracing::info!("Embedding worker stopped");
        }
    }

    async fn process(&self, task: EmbeddingTask) {
        let book_id = task.book_id;
        let started = Instant::now();

        match self.embed_and_store(task).await {
            Ok(()) => tracing::info!(
                book_id = %book_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Stored book embedding"
            ),
            Err(e) => tracing::error!(
                book_id = %book_id,
                error = %e,
                "Embedding task failed, dropping it"
            ),
        }
    }

    async fn embed_and_store(&self, task: EmbeddingTask) -> BookResult<()> {
        let embedding = self.embedder.embed(&task.text).await?;
        self.repository
            .save_embedding(task.book_id, &embedding)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EMBEDDING_DIMENSION, Embedding, MockEmbedder};
    use crate::error::BookError;
    use crate::repository::MockBookRepository;
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn embedding() -> Embedding {
        Embedding::try_from(vec![0.25; EMBEDDING_DIMENSION]).unwrap()
    }

    #[tokio::test]
    async fn test_failed_task_does_not_stop_the_loop() {
        let (first, second) = (Uuid::now_v7(), Uuid::now_v7());

        let mut embedder = MockEmbedder::new();
        embedder.expect_embed().returning(|text| {
            if text == "broken" {
                Err(BookError::EmbeddingShape {
                    expected: EMBEDDING_DIMENSION,
                    actual: 300,
                })
            } else {
                Ok(embedding())
            }
        });

        let mut repo = MockBookRepository::new();
        repo.expect_save_embedding()
            .with(eq(second), eq(embedding()))
            .times(1)
            .returning(|_, _| Ok(()));

        let (queue, rx) = EmbeddingQueue::new();
        let handle = EmbeddingWorker::new(rx, queue.clone(), Arc::new(embedder), Arc::new(repo)).spawn();

        queue.enqueue(EmbeddingTask::new(first, "broken"));
        queue.enqueue(EmbeddingTask::new(second, "fine"));

        while queue.pending() > 0 {
            tokio::task::yield_now().await;
        }

        // The worker finishes the task it holds before honouring the close
        queue.close();
        handle.await.unwrap();
        assert_eq!(queue.state(), QueueState::Closed);
    }

    #[tokio::test]
    async fn test_missing_book_is_logged_not_raised() {
        let id = Uuid::now_v7();

        let mut embedder = MockEmbedder::new();
        embedder.expect_embed().returning(|_| Ok(embedding()));

        let mut repo = MockBookRepository::new();
        repo.expect_save_embedding()
            .times(1)
            .returning(move |_, _| Err(BookError::NotFound(id)));

        let (queue, rx) = EmbeddingQueue::new();
        let worker = EmbeddingWorker::new(rx, queue.clone(), Arc::new(embedder), Arc::new(repo));

        worker.process(EmbeddingTask::new(id, "gone")).await;
    }

    #[tokio::test]
    async fn test_close_before_start_abandons_everything() {
        let mut embedder = MockEmbedder::new();
        embedder.expect_embed().never();
        let mut repo = MockBookRepository::new();
        repo.expect_save_embedding().never();

        let (queue, rx) = EmbeddingQueue::new();
        for i in 0..3 {
            queue.enqueue(EmbeddingTask::new(Uuid::now_v7(), format!("book {}", i)));
        }
        queue.close();

        EmbeddingWorker::new(rx, queue.clone(), Arc::new(embedder), Arc::new(repo))
            .run()
            .await;

        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.state(), QueueState::Closed);
    }
}
