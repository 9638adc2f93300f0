//! # Axum Helpers
//!
//! Shared HTTP plumbing for the workspace's Axum services.
//!
//! - **[`errors`]**: `AppError`, the `ErrorResponse` body and OpenAPI response types
//! - **[`extractors`]**: `ValidatedJson` and `UuidPath`
//! - **[`server`]**: router assembly, health/readiness, graceful shutdown
//!
//! ```ignore
//! let api_routes = Router::new().nest("/books", domain_books::handlers::router(service));
//! let app = create_router::<ApiDoc>(api_routes)
//!     .await?
//!     .merge(health_router(app_info!()));
//! create_production_app(app, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{UuidPath, ValidatedJson};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};
