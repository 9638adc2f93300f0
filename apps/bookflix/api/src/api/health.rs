//! Readiness with a real database check and the ingestion queue state.

use crate::state::AppState;
use axum::{extract::State, response::Response};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_books::QueueState;

/// Ready when the database answers and the ingestion queue still accepts work
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| format!("Database ping failed: {}", e))
            }),
        ),
        (
            "embedding_queue",
            Box::pin(async {
                match state.queue.state() {
                    QueueState::Open => Ok(()),
                    other => Err(format!(
                        "Embedding queue is {} ({} pending)",
                        other.as_str(),
                        state.queue.pending()
                    )),
                }
            }),
        ),
    ];

    run_health_checks(checks).await
}
