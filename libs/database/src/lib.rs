//! PostgreSQL connection management for the catalog service.
//!
//! Wraps SeaORM's pool with environment-driven configuration, connect-time
//! retry with exponential backoff, migration running, health checks, and a
//! startup probe for the pgvector extension that book embeddings depend on.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "bookflix_api").await?;
//! postgres::ensure_extension(&db, "vector").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
