//! Fire-and-forget embedding of written books.
//!
//! A book write calls [`EmbeddingQueue::on_book_written`], which never blocks. One
//! [`EmbeddingWorker`] drains the queue in FIFO order, embeds each text and
//! stores the vector. Failures are logged and the task is dropped; nothing is
//! retried and nothing survives a restart.

mod queue;
mod worker;

use uuid::Uuid;

use crate::models::Book;

pub use queue::{EmbeddingQueue, QueueState};
pub use worker::EmbeddingWorker;

/// One pending embedding: the book to update and the text to embed
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTask {
    pub book_id: Uuid,
    pub text: String,
}

impl EmbeddingTask {
    pub fn new(book_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            book_id,
            text: text.into(),
        }
    }

    pub fn for_book(book: &Book) -> Self {
        Self::new(book.id, embedding_text(book))
    }
}

/// The sentence a book is embedded as.
///
/// The description clause is left out when the description is missing or blank.
pub fn embedding_text(book: &Book) -> String {
    let description = match book.description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => format!(" with the following {}", d),
        _ => String::new(),
    };

    format!(
        "{} is a book,{} written by {} priced at {}, of genre {} with a rating {}",
        book.title, description, book.author, book.price, book.category.title, book.rating.name
    )
}
