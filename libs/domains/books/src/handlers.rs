use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadGatewayResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::{
    error::BookResult,
    models::{
        Book, Category, CreateBook, CreateBooks, Rating, RecommendationQuery,
        RecommendationResult, RecommendedBook, UpdateBook,
    },
    recommendation::RecommendationEngine,
    repository::BookRepository,
    service::BookService,
};

/// OpenAPI documentation for Books API
#[derive(OpenApi)]
#[openapi(
    paths(
        recommend_books,
        create_book,
        create_books,
        get_book,
        update_book,
    ),
    components(
        schemas(
            Book,
            Category,
            Rating,
            CreateBook,
            CreateBooks,
            UpdateBook,
            RecommendationQuery,
            RecommendationResult,
            RecommendedBook
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnprocessableEntityResponse,
            BadGatewayResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "books", description = "Book catalog and recommendation endpoints")
    )
)]
pub struct ApiDoc;

struct BooksState<R: BookRepository> {
    service: BookService<R>,
    engine: RecommendationEngine<R>,
}

/// Create Axum router for book endpoints
pub fn router<R>(service: BookService<R>, engine: RecommendationEngine<R>) -> Router
where
    R: BookRepository + 'static,
{
    let state = Arc::new(BooksState { service, engine });

    Router::new()
        .route("/", post(create_book))
        .route("/bulk", post(create_books))
        .route("/recommend", post(recommend_books))
        .route("/{id}", get(get_book).put(update_book))
        .with_state(state)
}

/// Recommend up to two books for a free-text query
#[utoipa::path(
    post,
    path = "/recommend",
    tag = "books",
    request_body = RecommendationQuery,
    responses(
        (status = 200, description = "Recommendation built, possibly with no books", body = RecommendationResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn recommend_books<R>(
    State(state): State<Arc<BooksState<R>>>,
    ValidatedJson(query): ValidatedJson<RecommendationQuery>,
) -> BookResult<impl IntoResponse>
where
    R: BookRepository,
{
    let result = state.engine.recommend(&query).await?;
    Ok(Json(result))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created, embedding queued", body = Book),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_book<R>(
    State(state): State<Arc<BooksState<R>>>,
    ValidatedJson(input): ValidatedJson<CreateBook>,
) -> BookResult<impl IntoResponse>
where
    R: BookRepository,
{
    let book = state.service.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Create several books in order, stopping at the first failure.
///
/// A failure answers 400 naming the book that failed; books before it stay created.
#[utoipa::path(
    post,
    path = "/bulk",
    tag = "books",
    request_body = CreateBooks,
    responses(
        (status = 201, description = "All books created", body = Vec<Book>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_books<R>(
    State(state): State<Arc<BooksState<R>>>,
    ValidatedJson(input): ValidatedJson<CreateBooks>,
) -> BookResult<impl IntoResponse>
where
    R: BookRepository,
{
    let books = state.service.create_books(input).await?;
    Ok((StatusCode::CREATED, Json(books)))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_book<R>(
    State(state): State<Arc<BooksState<R>>>,
    UuidPath(id): UuidPath,
) -> BookResult<impl IntoResponse>
where
    R: BookRepository,
{
    let book = state.service.get_book(id).await?;
    Ok(Json(book))
}

/// Replace a book's fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated, embedding queued", body = Book),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_book<R>(
    State(state): State<Arc<BooksState<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateBook>,
) -> BookResult<impl IntoResponse>
where
    R: BookRepository,
{
    let book = state.service.update_book(id, input).await?;
    Ok(Json(book))
}
