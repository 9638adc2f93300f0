use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::embedding::Embedding;

/// Reference data: a book genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
}

/// Reference data: a quality grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub id: Uuid,
    pub name: String,
}

/// A catalog book with its category and rating resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub price: i32,
    pub category: Category,
    pub rating: Rating,
    /// Null until the ingestion worker has processed the latest write
    #[serde(skip)]
    pub embedding: Option<Embedding>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new book
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateBook {
    #[validate(length(min = 3, max = 50))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub author: String,

    #[validate(range(min = 0, max = 100000))]
    pub price: i32,

    pub category_id: Uuid,
    pub rating_id: Uuid,
}

/// DTO for replacing a book's fields (PUT semantics: every field is required)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 3, max = 50))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub author: String,

    #[validate(range(min = 0, max = 100000))]
    pub price: i32,

    pub category_id: Uuid,
    pub rating_id: Uuid,
}

/// Bulk create payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateBooks {
    #[validate(length(min = 1, max = 200), nested)]
    pub books: Vec<CreateBook>,
}

/// Compact projection of a similarity-search hit, serialized into the LLM prompt.
///
/// Field names are PascalCase because the system prompt refers to `CategoryName`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CandidateBook {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub price: i32,
    pub category_name: String,
}

impl From<&Book> for CandidateBook {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            description: book.description.clone(),
            author: book.author.clone(),
            price: book.price,
            category_name: book.category.title.clone(),
        }
    }
}

/// Recommendation request body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct RecommendationQuery {
    /// Free-text description of the wanted book
    #[validate(length(min = 24))]
    #[schema(example = "a thriller about financial markets under 30 dollars")]
    pub query: String,

    /// Return the model's reasoning alongside the books
    #[serde(default)]
    pub explanation_needed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendedBook {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub price: i32,
    pub category_name: String,
    pub rating_name: String,
}

impl From<&Book> for RecommendedBook {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            description: book.description.clone(),
            author: book.author.clone(),
            price: book.price,
            category_name: book.category.title.clone(),
            rating_name: book.rating.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResult {
    pub message: String,
    pub books: Vec<RecommendedBook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
