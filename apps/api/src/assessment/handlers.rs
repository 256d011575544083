use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::assessment::SingleAssessment;
use crate::errors::AppError;
use crate::routes::with_timeout;
use crate::state::AppState;
use crate::uploads::{read_files, StagedUploads};

pub const RESUME_FIELD: &str = "resume";
pub const JOB_FIELD: &str = "job";

/// POST /score_resume
pub async fn handle_score_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SingleAssessment>, AppError> {
    let staged = StagedUploads::stage(read_files(multipart).await?).await?;
    let assessment = with_timeout(
        state.config.request_timeout,
        state
            .assessor
            .assess(staged.first(RESUME_FIELD), staged.first(JOB_FIELD)),
    )
    .await?;
    Ok(Json(assessment))
}
