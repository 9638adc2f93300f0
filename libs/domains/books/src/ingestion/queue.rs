use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, watch};

use super::EmbeddingTask;
use crate::models::Book;

/// Lifecycle of the ingestion queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting tasks
    Open,
    /// Closed for new tasks; the worker is finishing its current one
    Draining,
    /// The worker has exited
    Closed,
}

impl QueueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueState::Open => "open",
            QueueState::Draining => "draining",
            QueueState::Closed => "closed",
        }
    }
}

struct Shared {
    tx: mpsc::UnboundedSender<EmbeddingTask>,
    state: watch::Sender<QueueState>,
    pending: AtomicUsize,
}

/// Producer side of the ingestion pipeline. Cheap to clone.
#[derive(Clone)]
pub struct EmbeddingQueue {
    shared: Arc<Shared>,
}

impl EmbeddingQueue {
    /// Creates the queue and the receiver its single worker consumes
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EmbeddingTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(QueueState::Open);
        let queue = Self {
            shared: Arc::new(Shared {
                tx,
                state,
                pending: AtomicUsize::new(0),
            }),
        };
        (queue, rx)
    }

    /// Write hook: derive the embedding text and enqueue it
    pub fn on_book_written(&self, book: &Book) {
        self.enqueue(EmbeddingTask::for_book(book));
    }

    /// Accepts a task without waiting. Returns `false` when the queue is no longer
    /// open, in which case the task is dropped.
    pub fn enqueue(&self, task: EmbeddingTask) -> bool {
        if self.state() != QueueState::Open {
            tracing::debug!(book_id = %task.book_id, "Embedding queue closed, dropping task");
            return false;
        }

        let book_id = task.book_id;
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        if self.shared.tx.send(task).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!(book_id = %book_id, "Embedding worker gone, dropping task");
            return false;
        }

        tracing::debug!(book_id = %book_id, "Queued embedding task");
        true
    }

    /// Stops accepting tasks and tells the worker to stop after its current task
    pub fn close(&self) {
        let changed = self.shared.state.send_if_modified(|state| {
            if *state == QueueState::Open {
                *state = QueueState::Draining;
                true
            } else {
                false
            }
        });
        if changed {
            tracing::info!(pending = self.pending(), "Embedding queue closing");
        }
    }

    pub fn state(&self) -> QueueState {
        *self.shared.state.borrow()
    }

    /// Tasks accepted but not yet taken by the worker
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueState> {
        self.shared.state.subscribe()
    }

    pub(crate) fn task_taken(&self) {
        self.shared.pending.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn mark_closed(&self) {
        self.shared.state.send_replace(QueueState::Closed);
    }
}

impl std::fmt::Debug for EmbeddingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingQueue")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}
