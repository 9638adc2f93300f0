use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{BookError, BookResult},
    ingestion::EmbeddingQueue,
    models::{Book, CreateBook, CreateBooks, UpdateBook},
    repository::BookRepository,
};

/// Book Service - catalog writes and reads. Every successful write is handed to
/// the embedding queue.
pub struct BookService<R: BookRepository> {
    repository: Arc<R>,
    queue: EmbeddingQueue,
}

impl<R: BookRepository> BookService<R> {
    pub fn new(repository: Arc<R>, queue: EmbeddingQueue) -> Self {
        Self { repository, queue }
    }

    /// Create a new book with validation
    pub async fn create_book(&self, input: CreateBook) -> BookResult<Book> {
        input
            .validate()
            .map_err(|e| BookError::Validation(e.to_string()))?;

        let book = self.repository.create(input).await?;
        self.queue.on_book_written(&book);

        tracing::info!(book_id = %book.id, title = %book.title, "Created book");
        Ok(book)
    }

    /// Create books in order, stopping at the first failure.
    ///
    /// A failure is reported as [`BookError::BulkIncomplete`] naming the book that
    /// failed. Books created before it are kept and still embedded.
    pub async fn create_books(&self, input: CreateBooks) -> BookResult<Vec<Book>> {
        input
            .validate()
            .map_err(|e| BookError::Validation(e.to_string()))?;

        let total = input.books.len();
        let mut created = Vec::with_capacity(total);

        for (index, book) in input.books.into_iter().enumerate() {
            let title = book.title.clone();
            match self.create_book(book).await {
                Ok(book) => created.push(book),
                Err(e) => {
                    tracing::warn!(
                        index,
                        created = created.len(),
                        total,
                        error = %e,
                        "Bulk create stopped early"
                    );
                    return Err(BookError::BulkIncomplete {
                        title,
                        created: created.len(),
                        source: Box::new(e),
                    });
                }
            }
        }

        tracing::info!(created = created.len(), total, "Bulk created books");
        Ok(created)
    }

    /// Replace a book's fields with validation
    pub async fn update_book(&self, id: Uuid, input: UpdateBook) -> BookResult<Book> {
        input
            .validate()
            .map_err(|e| BookError::Validation(e.to_string()))?;

        let book = self.repository.update(id, input).await?;
        self.queue.on_book_written(&book);

        tracing::info!(book_id = %id, "Updated book");
        Ok(book)
    }

    /// Get book by ID
    pub async fn get_book(&self, id: Uuid) -> BookResult<Book> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id))
    }
}
