use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Book not found: {0}")]
    NotFound(Uuid),

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    EmbeddingShape { expected: usize, actual: usize },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Unparsable recommendation: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Book '{title}' by {author} priced at {price} already exists")]
    Duplicate {
        title: String,
        author: String,
        price: i32,
    },

    #[error("Bulk create failed at book '{title}' after {created} created: {source}")]
    BulkIncomplete {
        title: String,
        created: usize,
        source: Box<BookError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type BookResult<T> = Result<T, BookError>;

impl BookError {
    /// Errors caused by the request rather than by the server
    pub fn is_client_error(&self) -> bool {
        match self {
            BookError::NotFound(_) | BookError::Validation(_) | BookError::Duplicate { .. } => true,
            BookError::BulkIncomplete { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

impl From<sea_orm::DbErr> for BookError {
    fn from(err: sea_orm::DbErr) -> Self {
        BookError::Internal(format!("Database error: {}", err))
    }
}

impl From<reqwest::Error> for BookError {
    fn from(err: reqwest::Error) -> Self {
        BookError::Provider(err.to_string())
    }
}

impl From<core_config::ConfigError> for BookError {
    fn from(err: core_config::ConfigError) -> Self {
        BookError::Config(err.to_string())
    }
}

/// Convert BookError to AppError for standardized HTTP error responses
impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(id) => AppError::NotFound(format!("Book {} not found", id)),
            err @ BookError::EmbeddingShape { .. } => AppError::InternalServerError(err.to_string()),
            BookError::Provider(msg) => AppError::BadGateway(msg),
            BookError::Parse(msg) => AppError::UnprocessableEntity(msg),
            BookError::Validation(msg) => AppError::BadRequest(msg),
            err @ BookError::Duplicate { .. } => AppError::Conflict(err.to_string()),
            err @ BookError::BulkIncomplete { .. } => {
                let message = err.to_string();
                if err.is_client_error() {
                    AppError::BadRequest(message)
                } else {
                    AppError::InternalServerError(message)
                }
            }
            BookError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            BookError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
