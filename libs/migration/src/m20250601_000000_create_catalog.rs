use sea_orm_migration::{prelude::*, schema::*};

/// Must match the output width of the embedding model
const EMBEDDING_DIMENSION: u32 = 384;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto")
            .await?;
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS vector")
            .await?;

        db.execute_unprepared("CREATE SCHEMA IF NOT EXISTS util")
            .await?;
        db.execute_unprepared(
            r#"
            CREATE OR REPLACE FUNCTION util.touch_updated_at()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Categories::Id))
                    .col(string(Categories::Title).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Ratings::Id))
                    .col(string(Ratings::Name).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(pk_uuid(Books::Id))
                    .col(string(Books::Title))
                    .col(text_null(Books::Description))
                    .col(string(Books::Author))
                    .col(integer(Books::Price))
                    .col(uuid(Books::CategoryId))
                    .col(uuid(Books::RatingId))
                    .col(
                        timestamp_with_time_zone(Books::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Books::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_category_id")
                            .from(Books::Table, Books::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_rating_id")
                            .from(Books::Table, Books::RatingId)
                            .to(Ratings::Table, Ratings::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // The same book must not be listed twice at the same price
        manager
            .create_index(
                Index::create()
                    .name("uq_books_title_author_price")
                    .table(Books::Table)
                    .col(Books::Title)
                    .col(Books::Author)
                    .col(Books::Price)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_books_category_id")
                    .table(Books::Table)
                    .col(Books::CategoryId)
                    .to_owned(),
            )
            .await?;

        // sea-query has no column type for pgvector, so the embedding column
        // and its ANN index are plain SQL
        db.execute_unprepared(&format!(
            "ALTER TABLE books ADD COLUMN IF NOT EXISTS embedding vector({})",
            EMBEDDING_DIMENSION
        ))
        .await?;

        db.execute_unprepared(
            r#"
            CREATE INDEX IF NOT EXISTS idx_books_embedding_cosine
                ON books USING hnsw (embedding vector_cosine_ops)
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TRIGGER books_touch_updated_at
                BEFORE UPDATE ON books
                FOR EACH ROW
                EXECUTE FUNCTION util.touch_updated_at()
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS books_touch_updated_at ON books")
            .await?;

        manager
            .drop_table(Table::drop().table(Books::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ratings::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS util.touch_updated_at()")
            .await?;

        // Extensions stay installed; other databases on the server may use them
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Title,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Title,
    Description,
    Author,
    Price,
    CategoryId,
    RatingId,
    CreatedAt,
    UpdatedAt,
}
