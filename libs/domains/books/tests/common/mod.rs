//! Fakes shared by the integration tests: a keyword embedding runtime and a
//! scripted chat-completion client.

#![allow(dead_code)]

use async_trait::async_trait;
use domain_books::embedding::{EMBEDDING_DIMENSION, EmbeddingRuntime};
use domain_books::llm::{ChatCompletion, ChatMessage};
use domain_books::{BookError, BookResult, CreateBook, reference};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Keywords that each own one axis of the fake embedding space
pub const TOPICS: [&str; 4] = ["invest", "dragon", "empire", "robot"];

/// Embeds text as the sum of the topic axes it mentions plus a small shared
/// component, so texts with the same topic are near and others are far.
pub struct KeywordRuntime;

impl EmbeddingRuntime for KeywordRuntime {
    fn embed(&mut self, text: &str) -> BookResult<Vec<f32>> {
        let text = text.to_lowercase();
        let mut v = vec![0.0; EMBEDDING_DIMENSION];
        for (axis, topic) in TOPICS.iter().enumerate() {
            if text.contains(topic) {
                v[axis] = 1.0;
            }
        }
        v[EMBEDDING_DIMENSION - 1] = 0.1;
        Ok(v)
    }
}

/// Returns vectors of the wrong width
pub struct ShortRuntime(pub usize);

impl EmbeddingRuntime for ShortRuntime {
    fn embed(&mut self, _text: &str) -> BookResult<Vec<f32>> {
        Ok(vec![0.5; self.0])
    }
}

/// Blocks every call until the test releases it through the paired sender
pub struct GatedRuntime {
    gate: std::sync::mpsc::Receiver<()>,
}

impl GatedRuntime {
    pub fn new() -> (Self, std::sync::mpsc::Sender<()>) {
        let (tx, gate) = std::sync::mpsc::channel();
        (Self { gate }, tx)
    }
}

impl EmbeddingRuntime for GatedRuntime {
    fn embed(&mut self, text: &str) -> BookResult<Vec<f32>> {
        self.gate
            .recv()
            .map_err(|_| BookError::Provider("gate closed".to_string()))?;
        KeywordRuntime.embed(text)
    }
}

type Script = dyn Fn(&[ChatMessage]) -> BookResult<String> + Send + Sync;

/// Chat client whose reply is computed from the request by a closure
pub struct ScriptedChat {
    script: Box<Script>,
    calls: AtomicUsize,
    last_request: Mutex<Vec<ChatMessage>>,
}

impl ScriptedChat {
    pub fn new(
        script: impl Fn(&[ChatMessage]) -> BookResult<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, messages: Vec<ChatMessage>) -> BookResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = (self.script)(&messages);
        *self.last_request.lock().unwrap() = messages;
        reply
    }
}

/// Candidate ids in the order they were sent to the model
pub fn offered_ids(messages: &[ChatMessage]) -> Vec<Uuid> {
    let user = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
    let json = user
        .split_once("Available Books: ")
        .map(|(_, json)| json)
        .unwrap_or("[]");
    let books: Vec<serde_json::Value> = serde_json::from_str(json).unwrap();
    books
        .iter()
        .map(|b| b["Id"].as_str().unwrap().parse().unwrap())
        .collect()
}

pub fn create_input(title: &str, description: &str) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        description: Some(description.to_string()),
        author: "Test Author".to_string(),
        price: 20,
        category_id: reference::FICTION,
        rating_id: reference::GOOD,
    }
}

/// Polls until `check` holds or a second has passed
pub async fn eventually(mut check: impl AsyncFnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}
