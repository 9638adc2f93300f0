//! Handler tests for Books domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization and validation
//! - Response serialization and status codes
//! - Domain errors mapped to the standard error body
//!
//! The repository is in-memory and the LLM is scripted.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use domain_books::recommendation::NO_MATCH_MESSAGE;
use domain_books::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

struct TestApp {
    router: Router,
    queue: EmbeddingQueue,
    _rx: tokio::sync::mpsc::UnboundedReceiver<ingestion::EmbeddingTask>,
}

fn app_with(repository: Arc<InMemoryBookRepository>, chat: Arc<ScriptedChat>) -> TestApp {
    let embedder = Arc::new(VectorEmbedder::new(Box::new(KeywordRuntime)));
    let (queue, rx) = EmbeddingQueue::new();
    let service = BookService::new(repository.clone(), queue.clone());
    let engine = RecommendationEngine::new(repository, embedder, LlmReranker::new(chat));

    TestApp {
        router: handlers::router(service, engine),
        queue,
        _rx: rx,
    }
}

fn app() -> TestApp {
    app_with(
        Arc::new(InMemoryBookRepository::new()),
        ScriptedChat::replying(""),
    )
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn book_json(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Stocks and bonds",
        "author": "Jane Doe",
        "price": 25,
        "category_id": reference::FINANCE,
        "rating_id": reference::GOOD
    })
}

#[tokio::test]
async fn test_create_book_returns_201_and_queues_embedding() {
    let app = app();

    let response = app
        .router
        .oneshot(json_request("POST", "/", book_json("Invest Early")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = json_body(response.into_body()).await;
    assert_eq!(book["title"], "Invest Early");
    assert_eq!(book["category"]["title"], "Finance");
    assert_eq!(book["rating"]["name"], "Good");
    assert!(book.get("embedding").is_none());
    assert_eq!(app.queue.pending(), 1);
}

#[tokio::test]
async fn test_create_book_validates_input() {
    let app = app();

    let response = app
        .router
        .oneshot(json_request("POST", "/", book_json("ab")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["title"].is_array());
    assert_eq!(app.queue.pending(), 0);
}

#[tokio::test]
async fn test_unknown_category_is_400() {
    let app = app();
    let mut input = book_json("Invest Early");
    input["category_id"] = json!(uuid::Uuid::now_v7());

    let response = app
        .router
        .oneshot(json_request("POST", "/", input))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_book_is_409() {
    let repository = Arc::new(InMemoryBookRepository::new());
    let app = app_with(repository, ScriptedChat::replying(""));

    let first = app
        .router
        .clone()
        .oneshot(json_request("POST", "/", book_json("Invest Early")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .router
        .oneshot(json_request("POST", "/", book_json("Invest Early")))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = json_body(second.into_body()).await;
    assert_eq!(body["error"], "CONFLICT");
    assert_eq!(app.queue.pending(), 1);
}

#[tokio::test]
async fn test_bulk_create_reports_failing_book() {
    let app = app();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/bulk",
            json!({ "books": [
                book_json("Invest Early"),
                book_json("Invest Later"),
                book_json("Invest Early"),
                book_json("Invest Never")
            ]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("'Invest Early'"), "{}", message);
    assert!(message.contains("after 2 created"), "{}", message);

    // Books before the failure stay created and queued
    assert_eq!(app.queue.pending(), 2);
    let retry = app
        .router
        .oneshot(json_request("POST", "/", book_json("Invest Later")))
        .await
        .unwrap();
    assert_eq!(retry.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bulk_create_returns_all_books() {
    let app = app();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/bulk",
            json!({ "books": [book_json("Invest Early"), book_json("Invest Later")] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let books: Vec<Value> = json_body(response.into_body()).await;
    let titles: Vec<&str> = books.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Invest Early", "Invest Later"]);
    assert_eq!(app.queue.pending(), 2);
}

#[tokio::test]
async fn test_bulk_create_caps_at_200_books() {
    let app = app();
    let books: Vec<Value> = (0..201).map(|n| book_json(&format!("Invest Vol {}", n))).collect();

    let response = app
        .router
        .oneshot(json_request("POST", "/bulk", json!({ "books": books })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.queue.pending(), 0);
}

#[tokio::test]
async fn test_bulk_create_rejects_empty_list() {
    let app = app();

    let response = app
        .router
        .oneshot(json_request("POST", "/bulk", json!({ "books": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_and_update_book() {
    let repository = Arc::new(InMemoryBookRepository::new());
    let created = repository
        .create(create_input("Dragon Riders", "Wings"))
        .await
        .unwrap();
    let app = app_with(repository, ScriptedChat::replying(""));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let book: Book = json_body(response.into_body()).await;
    assert_eq!(book.id, created.id);

    let mut update = book_json("Dragon Riders II");
    update["category_id"] = json!(reference::FICTION);
    let response = app
        .router
        .oneshot(json_request("PUT", &format!("/{}", created.id), update))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let book: Book = json_body(response.into_body()).await;
    assert_eq!(book.title, "Dragon Riders II");
    assert_eq!(book.category.id, reference::FICTION);
    assert_eq!(app.queue.pending(), 1);
}

#[tokio::test]
async fn test_get_book_not_found() {
    let app = app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(format!("/{}", uuid::Uuid::now_v7()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_book_invalid_uuid() {
    let app = app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_UUID");
}

#[tokio::test]
async fn test_recommendation_no_match() {
    let app = app();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/recommend",
            json!({ "query": "something on how to invest my savings" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], NO_MATCH_MESSAGE);
    assert_eq!(body["books"], json!([]));
    assert!(body.get("explanation").is_none());
}

#[tokio::test]
async fn test_recommendation_short_query_is_400() {
    let app = app();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/recommend",
            json!({ "query": "invest" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendation_parse_error_is_422() {
    let app = app_with(
        Arc::new(InMemoryBookRepository::new()),
        ScriptedChat::replying("no reasoning here"),
    );

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/recommend",
            json!({
                "query": "something on how to invest my savings",
                "explanation_needed": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_recommendation_provider_failure_is_502() {
    let app = app_with(
        Arc::new(InMemoryBookRepository::new()),
        ScriptedChat::new(|_| Err(BookError::Provider("upstream 503".to_string()))),
    );

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/recommend",
            json!({ "query": "something on how to invest my savings" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "UPSTREAM_ERROR");
}
