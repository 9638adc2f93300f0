//! Ingestion pipeline tests
//!
//! Writes go through `BookService`, the worker embeds with a fake runtime and
//! stores into the in-memory repository.

mod common;

use common::*;
use domain_books::*;
use std::sync::Arc;
use tokio::task::JoinHandle;

struct Pipeline {
    repository: Arc<InMemoryBookRepository>,
    embedder: VectorEmbedder,
    queue: EmbeddingQueue,
    service: BookService<InMemoryBookRepository>,
    worker: JoinHandle<()>,
}

fn pipeline(runtime: Box<dyn embedding::EmbeddingRuntime>) -> Pipeline {
    let repository = Arc::new(InMemoryBookRepository::new());
    let embedder = VectorEmbedder::new(runtime);
    let (queue, rx) = EmbeddingQueue::new();
    let worker = EmbeddingWorker::new(
        rx,
        queue.clone(),
        Arc::new(embedder.clone()),
        repository.clone(),
    )
    .spawn();
    let service = BookService::new(repository.clone(), queue.clone());

    Pipeline {
        repository,
        embedder,
        queue,
        service,
        worker,
    }
}

async fn embedded(repository: &InMemoryBookRepository, id: uuid::Uuid) -> bool {
    repository
        .get_by_id(id)
        .await
        .unwrap()
        .is_some_and(|b| b.embedding.is_some())
}

#[tokio::test]
async fn test_written_book_is_embedded_in_background() {
    let p = pipeline(Box::new(KeywordRuntime));

    let book = p
        .service
        .create_book(create_input("Invest Wisely", "Index funds"))
        .await
        .unwrap();
    assert!(book.embedding.is_none(), "write returns before embedding");

    let repo = p.repository.clone();
    assert!(eventually(async || embedded(&repo, book.id).await).await);

    p.queue.close();
    p.worker.await.unwrap();
    assert_eq!(p.queue.state(), QueueState::Closed);
}

#[tokio::test]
async fn test_update_replaces_embedding() {
    let p = pipeline(Box::new(KeywordRuntime));

    let book = p
        .service
        .create_book(create_input("Invest Wisely", "Index funds"))
        .await
        .unwrap();
    let repo = p.repository.clone();
    assert!(eventually(async || embedded(&repo, book.id).await).await);
    let before = repo.get_by_id(book.id).await.unwrap().unwrap().embedding;

    let update = UpdateBook {
        title: "Dragon Riders".to_string(),
        description: None,
        author: book.author.clone(),
        price: book.price,
        category_id: reference::FICTION,
        rating_id: reference::GOOD,
    };
    p.service.update_book(book.id, update).await.unwrap();

    assert!(
        eventually(async || {
            repo.get_by_id(book.id).await.unwrap().unwrap().embedding != before
        })
        .await
    );
}

#[tokio::test]
async fn test_wrong_dimension_leaves_book_without_embedding() {
    let p = pipeline(Box::new(ShortRuntime(300)));

    let first = p
        .service
        .create_book(create_input("Invest Wisely", "Index funds"))
        .await
        .unwrap();
    let second = p
        .service
        .create_book(create_input("Dragon Riders", "Wings"))
        .await
        .unwrap();

    let queue = p.queue.clone();
    assert!(eventually(async || queue.pending() == 0 && p.embedder.in_flight() == 0).await);

    // Both writes succeeded; the worker survived the first failure
    for id in [first.id, second.id] {
        let stored = p.repository.get_by_id(id).await.unwrap().unwrap();
        assert!(stored.embedding.is_none());
    }
    assert!(!p.worker.is_finished());
}

#[tokio::test]
async fn test_close_mid_drain_abandons_pending_tasks() {
    let (runtime, gate) = GatedRuntime::new();
    let p = pipeline(Box::new(runtime));

    let mut ids = Vec::new();
    for title in ["Invest One", "Invest Two", "Invest Three", "Invest Four"] {
        let book = p
            .service
            .create_book(create_input(title, "Bonds"))
            .await
            .unwrap();
        ids.push(book.id);
    }

    // Worker is stuck inside the first task with three behind it
    let embedder = p.embedder.clone();
    assert!(eventually(async || embedder.in_flight() == 1).await);
    assert_eq!(p.queue.pending(), 3);

    p.queue.close();
    assert_eq!(p.queue.state(), QueueState::Draining);

    // Writes while draining still succeed but are not queued
    let late = p
        .service
        .create_book(create_input("Invest Five", "Gold"))
        .await
        .unwrap();

    gate.send(()).unwrap();
    drop(gate);
    p.worker.await.unwrap();

    assert_eq!(p.queue.state(), QueueState::Closed);
    assert_eq!(p.queue.pending(), 0);
    assert!(embedded(&p.repository, ids[0]).await);
    for id in ids[1..].iter().chain([&late.id]) {
        assert!(!embedded(&p.repository, *id).await);
    }
}

#[tokio::test]
async fn test_queue_drains_in_write_order() {
    let (runtime, gate) = GatedRuntime::new();
    let p = pipeline(Box::new(runtime));

    let mut ids = Vec::new();
    for title in ["Robot A", "Robot B", "Robot C"] {
        ids.push(
            p.service
                .create_book(create_input(title, "Gears"))
                .await
                .unwrap()
                .id,
        );
    }

    for (n, id) in ids.iter().enumerate() {
        gate.send(()).unwrap();
        let repo = p.repository.clone();
        assert!(eventually(async || embedded(&repo, *id).await).await);
        for later in &ids[n + 1..] {
            assert!(!embedded(&p.repository, *later).await);
        }
    }
}
