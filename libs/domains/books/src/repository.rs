use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::embedding::Embedding;
use crate::error::{BookError, BookResult};
use crate::models::{Book, Category, CreateBook, Rating, UpdateBook};
use crate::reference;

/// Most candidates a similarity search returns
pub const SIMILARITY_LIMIT: usize = 5;

/// Cosine distance a candidate must stay strictly below
pub const SIMILARITY_MAX_DISTANCE: f32 = 0.7;

/// Repository trait for Book persistence and vector search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book; fails with `Validation` on unknown category/rating and
    /// `Duplicate` when title, author and price are already taken
    async fn create(&self, input: CreateBook) -> BookResult<Book>;

    /// Replace a book's fields, keeping its current embedding
    async fn update(&self, id: Uuid, input: UpdateBook) -> BookResult<Book>;

    async fn get_by_id(&self, id: Uuid) -> BookResult<Option<Book>>;

    /// Up to [`SIMILARITY_LIMIT`] embedded books below [`SIMILARITY_MAX_DISTANCE`], nearest first
    async fn find_similar(&self, embedding: &Embedding) -> BookResult<Vec<Book>>;

    /// Overwrite a book's embedding; `NotFound` when the book is gone
    async fn save_embedding(&self, id: Uuid, embedding: &Embedding) -> BookResult<()>;
}

/// In-memory implementation of BookRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryBookRepository {
    books: Arc<RwLock<HashMap<Uuid, Book>>>,
    categories: Arc<HashMap<Uuid, Category>>,
    ratings: Arc<HashMap<Uuid, Rating>>,
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBookRepository {
    /// Empty catalog with the seeded categories and ratings
    pub fn new() -> Self {
        Self {
            books: Arc::new(RwLock::new(HashMap::new())),
            categories: Arc::new(reference::categories().into_iter().map(|c| (c.id, c)).collect()),
            ratings: Arc::new(reference::ratings().into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    fn resolve(&self, category_id: Uuid, rating_id: Uuid) -> BookResult<(Category, Rating)> {
        let category = self
            .categories
            .get(&category_id)
            .cloned()
            .ok_or_else(|| BookError::Validation(format!("Unknown category {}", category_id)))?;
        let rating = self
            .ratings
            .get(&rating_id)
            .cloned()
            .ok_or_else(|| BookError::Validation(format!("Unknown rating {}", rating_id)))?;
        Ok((category, rating))
    }

    fn ensure_unique(
        books: &HashMap<Uuid, Book>,
        except: Option<Uuid>,
        title: &str,
        author: &str,
        price: i32,
    ) -> BookResult<()> {
        let taken = books.values().any(|b| {
            Some(b.id) != except && b.title == title && b.author == author && b.price == price
        });
        if taken {
            return Err(BookError::Duplicate {
                title: title.to_string(),
                author: author.to_string(),
                price,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn create(&self, input: CreateBook) -> BookResult<Book> {
        let (category, rating) = self.resolve(input.category_id, input.rating_id)?;
        let mut books = self.books.write().await;
        Self::ensure_unique(&books, None, &input.title, &input.author, input.price)?;

        let now = Utc::now();
        let book = Book {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            author: input.author,
            price: input.price,
            category,
            rating,
            embedding: None,
            created_at: now,
            updated_at: now,
        };
        books.insert(book.id, book.clone());

        tracing::debug!(book_id = %book.id, "Inserted book");
        Ok(book)
    }

    async fn update(&self, id: Uuid, input: UpdateBook) -> BookResult<Book> {
        let (category, rating) = self.resolve(input.category_id, input.rating_id)?;
        let mut books = self.books.write().await;
        if !books.contains_key(&id) {
            return Err(BookError::NotFound(id));
        }
        Self::ensure_unique(&books, Some(id), &input.title, &input.author, input.price)?;

        let book = books.get_mut(&id).ok_or(BookError::NotFound(id))?;
        book.title = input.title;
        book.description = input.description;
        book.author = input.author;
        book.price = input.price;
        book.category = category;
        book.rating = rating;
        book.updated_at = Utc::now();

        tracing::debug!(book_id = %id, "Replaced book");
        Ok(book.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> BookResult<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.get(&id).cloned())
    }

    async fn find_similar(&self, embedding: &Embedding) -> BookResult<Vec<Book>> {
        let books = self.books.read().await;

        let mut hits: Vec<(f32, &Book)> = books
            .values()
            .filter_map(|b| {
                b.embedding
                    .as_ref()
                    .map(|e| (embedding.cosine_distance(e), b))
            })
            .filter(|(distance, _)| *distance < SIMILARITY_MAX_DISTANCE)
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(hits
            .into_iter()
            .take(SIMILARITY_LIMIT)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn save_embedding(&self, id: Uuid, embedding: &Embedding) -> BookResult<()> {
        let mut books = self.books.write().await;
        let book = books.get_mut(&id).ok_or(BookError::NotFound(id))?;
        book.embedding = Some(embedding.clone());

        tracing::debug!(book_id = %id, "Saved embedding");
        Ok(())
    }
}
