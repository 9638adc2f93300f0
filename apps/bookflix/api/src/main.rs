use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres;
use domain_books::{EmbeddingQueue, EmbeddingWorker, GroqClient, PgBookRepository, VectorEmbedder};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }
    postgres::ensure_extension(&db, "vector").await?;

    // Model load may download weights; keep it off the async workers
    let embedding_config = config.embedding.clone();
    info!(model = %embedding_config.model, "Loading embedding model");
    let embedder =
        tokio::task::spawn_blocking(move || VectorEmbedder::from_config(&embedding_config))
            .await??;
    let embedder = Arc::new(embedder);
    embedder.warm_up().await?;

    let llm = Arc::new(GroqClient::new(config.llm.clone())?);
    info!(model = %llm.model(), "LLM client ready");

    let repository = Arc::new(PgBookRepository::new(db.clone()));
    let (queue, rx) = EmbeddingQueue::new();
    let worker = EmbeddingWorker::new(rx, queue.clone(), embedder.clone(), repository.clone()).spawn();

    let state = AppState {
        config,
        db,
        repository,
        embedder,
        queue,
        llm,
    };

    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // - /health: liveness check with app name/version
    // - /ready: database check and ingestion queue state
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting Bookflix API");

    let server = state.config.server.clone();
    let AppState { db, queue, .. } = state;
    create_production_app(app, &server, server.shutdown_timeout, async move {
        // The worker finishes its current task; queued ones are dropped
        queue.close();
        match worker.await {
            Ok(()) => info!("Embedding worker stopped"),
            Err(e) => tracing::error!("Embedding worker panicked: {}", e),
        }

        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Bookflix API shutdown complete");
    Ok(())
}
