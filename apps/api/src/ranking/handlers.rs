use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ranking::formatter::format_ranking;
use crate::ranking::models::RankingResult;
use crate::routes::with_timeout;
use crate::state::AppState;
use crate::uploads::{read_files, StagedUploads};

pub const JOB_FIELD: &str = "job";
pub const RESUMES_FIELD: &str = "resumes";

#[derive(Debug, Deserialize)]
pub struct RankQuery {
    /// Render the HTML table into `Summary`.
    #[serde(default = "default_table")]
    pub table: bool,
}

fn default_table() -> bool {
    true
}

/// POST /score_resumes_ranked
pub async fn handle_score_resumes_ranked(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
    multipart: Multipart,
) -> Result<Json<RankingResult>, AppError> {
    let staged = StagedUploads::stage(read_files(multipart).await?).await?;
    let resumes = staged.all(RESUMES_FIELD);

    let ranking = with_timeout(
        state.config.request_timeout,
        state.ranker.rank(staged.first(JOB_FIELD), &resumes),
    )
    .await?;

    if query.table {
        Ok(Json(format_ranking(ranking)))
    } else {
        Ok(Json(ranking))
    }
}
