pub mod health;

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tracing::warn;

use crate::assessment::handlers as assessment;
use crate::errors::AppError;
use crate::ranking::handlers as ranking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(health::liveness_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/score_resumes_ranked",
            post(ranking::handle_score_resumes_ranked),
        )
        .route("/score_resume", post(assessment::handle_score_resume))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bounds a request's pipeline so a stalled upstream fails with 504 instead of hanging.
pub(crate) async fn with_timeout<T, F>(limit: Duration, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, work).await.map_err(|_| {
        warn!("Request exceeded {}ms deadline", limit.as_millis());
        AppError::Timeout(limit)
    })?
}
