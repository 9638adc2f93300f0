use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, RetryConfig, retry_with_backoff};

/// Open a pool using the given configuration
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let max_connections = config.max_connections;
    let db = Database::connect(config.into_connect_options()).await?;
    info!(max_connections, "Connected to PostgreSQL");
    Ok(db)
}

/// Open a pool, retrying with exponential backoff while the server is unreachable.
///
/// `None` uses [`RetryConfig::default`]. Meant for process start-up, where the
/// database container may still be booting.
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    retry_with_backoff(
        || connect_from_config(config.clone()),
        retry_config.unwrap_or_default(),
    )
    .await
}

/// Apply all pending migrations of `M`
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DatabaseError> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!(app = app_name, "Migrations completed");
    Ok(())
}

/// Fail fast when `extension` is not installed in the connected database.
///
/// Returns the installed version on success.
pub async fn ensure_extension(
    db: &DatabaseConnection,
    extension: &str,
) -> Result<String, DatabaseError> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT extversion FROM pg_extension WHERE extname = $1",
        [extension.into()],
    );

    let row = db
        .query_one_raw(stmt)
        .await?
        .ok_or_else(|| DatabaseError::MissingExtension(extension.to_string()))?;
    let version: String = row.try_get("", "extversion")?;

    info!(extension, version = %version, "PostgreSQL extension available");
    Ok(version)
}
