use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::prelude::{Expr, PgVector};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, SqlErr, Statement,
};
use uuid::Uuid;

use crate::{
    embedding::Embedding,
    entity::{books, categories, ratings},
    error::{BookError, BookResult},
    models::{Book, Category, CreateBook, Rating, UpdateBook},
    repository::{BookRepository, SIMILARITY_LIMIT, SIMILARITY_MAX_DISTANCE},
};

/// Columns of a book joined with its category and rating
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.description, b.author, b.price,
           b.category_id, c.title AS category_title,
           b.rating_id, r.name AS rating_name,
           b.embedding,
           b.created_at, b.updated_at
    FROM books b
    JOIN categories c ON c.id = b.category_id
    JOIN ratings r ON r.id = b.rating_id
"#;

/// PostgreSQL + pgvector implementation of BookRepository
#[derive(Clone)]
pub struct PgBookRepository {
    db: DatabaseConnection,
}

impl PgBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn check_reference(&self, category_id: Uuid, rating_id: Uuid) -> BookResult<()> {
        if categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(BookError::Validation(format!("Unknown category {}", category_id)));
        }
        if ratings::Entity::find_by_id(rating_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(BookError::Validation(format!("Unknown rating {}", rating_id)));
        }
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> BookResult<Option<Book>> {
        let sql = format!("{} WHERE b.id = $1", BOOK_SELECT);
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        BookRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(Book::try_from)
            .transpose()
    }
}

/// Helper struct for deserializing joined book rows
#[derive(Debug, FromQueryResult)]
struct BookRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    author: String,
    price: i32,
    category_id: Uuid,
    category_title: String,
    rating_id: Uuid,
    rating_name: String,
    embedding: Option<PgVector>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = BookError;

    fn try_from(row: BookRow) -> BookResult<Self> {
        let embedding = row.embedding.map(Embedding::try_from).transpose()?;

        Ok(Book {
            id: row.id,
            title: row.title,
            description: row.description,
            author: row.author,
            price: row.price,
            category: Category {
                id: row.category_id,
                title: row.category_title,
            },
            rating: Rating {
                id: row.rating_id,
                name: row.rating_name,
            },
            embedding,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Maps constraint violations on `books` to domain errors
fn write_error(err: DbErr, title: &str, author: &str, price: i32) -> BookError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => BookError::Duplicate {
            title: title.to_string(),
            author: author.to_string(),
            price,
        },
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            BookError::Validation(format!("Unknown category or rating: {}", detail))
        }
        _ => BookError::Internal(format!("Database error: {}", err)),
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn create(&self, input: CreateBook) -> BookResult<Book> {
        self.check_reference(input.category_id, input.rating_id)
            .await?;

        let now = chrono::Utc::now();
        let active_model = books::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(input.title.clone()),
            description: Set(input.description),
            author: Set(input.author.clone()),
            price: Set(input.price),
            category_id: Set(input.category_id),
            rating_id: Set(input.rating_id),
            embedding: NotSet,
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &input.title, &input.author, input.price))?;

        tracing::debug!(book_id = %model.id, "Inserted book");

        self.fetch(model.id)
            .await?
            .ok_or_else(|| BookError::Internal(format!("Book {} vanished after insert", model.id)))
    }

    async fn update(&self, id: Uuid, input: UpdateBook) -> BookResult<Book> {
        let existing = books::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BookError::NotFound(id))?;

        self.check_reference(input.category_id, input.rating_id)
            .await?;

        let mut active_model: books::ActiveModel = existing.into();
        active_model.title = Set(input.title.clone());
        active_model.description = Set(input.description);
        active_model.author = Set(input.author.clone());
        active_model.price = Set(input.price);
        active_model.category_id = Set(input.category_id);
        active_model.rating_id = Set(input.rating_id);

        active_model
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, &input.title, &input.author, input.price))?;

        tracing::debug!(book_id = %id, "Replaced book");

        self.fetch(id).await?.ok_or(BookError::NotFound(id))
    }

    async fn get_by_id(&self, id: Uuid) -> BookResult<Option<Book>> {
        self.fetch(id).await
    }

    async fn find_similar(&self, embedding: &Embedding) -> BookResult<Vec<Book>> {
        let sql = format!(
            "{} WHERE b.embedding IS NOT NULL AND (b.embedding <=> $1) < $2 \
             ORDER BY b.embedding <=> $1 LIMIT $3",
            BOOK_SELECT
        );
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                PgVector::from(embedding).into(),
                f64::from(SIMILARITY_MAX_DISTANCE).into(),
                (SIMILARITY_LIMIT as i64).into(),
            ],
        );

        let rows = BookRow::find_by_statement(stmt).all(&self.db).await?;

        tracing::debug!(candidates = rows.len(), "Similarity search");
        rows.into_iter().map(Book::try_from).collect()
    }

    async fn save_embedding(&self, id: Uuid, embedding: &Embedding) -> BookResult<()> {
        let result = books::Entity::update_many()
            .col_expr(books::Column::Embedding, Expr::value(PgVector::from(embedding)))
            .filter(books::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(BookError::NotFound(id));
        }

        tracing::debug!(book_id = %id, "Saved embedding");
        Ok(())
    }
}
