use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{Document, EvidenceMode, Extractor};
use crate::llm_client::TextGenerator;
use crate::ranking::models::{CandidateEvidence, RankingResult};
use crate::ranking::prompts::compose_ranking_request;
use crate::ranking::validation::validate_ranking;
use crate::similarity::{round_score, SimilarityScorer};

/// Runs the ranking pipeline: extract, score, one LLM call, validate, normalize.
pub struct RankingOrchestrator {
    extractor: Extractor,
    scorer: SimilarityScorer,
    llm: Arc<dyn TextGenerator>,
    max_concurrency: usize,
    evidence_mode: EvidenceMode,
}

impl RankingOrchestrator {
    pub fn new(
        extractor: Extractor,
        scorer: SimilarityScorer,
        llm: Arc<dyn TextGenerator>,
        max_concurrency: usize,
        evidence_mode: EvidenceMode,
    ) -> Self {
        Self {
            extractor,
            scorer,
            llm,
            max_concurrency: max_concurrency.max(1),
            evidence_mode,
        }
    }

    /// Ranks `resumes` against `job`. Any failing resume aborts the whole request.
    pub async fn rank(
        &self,
        job: Option<&Document>,
        resumes: &[Document],
    ) -> Result<RankingResult, AppError> {
        let job = job.ok_or_else(|| {
            AppError::MissingInput("a job description file ('job') is required".to_string())
        })?;
        if resumes.is_empty() {
            return Err(AppError::MissingInput(
                "at least one resume file ('resumes') is required".to_string(),
            ));
        }
        reject_duplicate_filenames(resumes)?;

        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] Ranking {} resume(s) against '{}'",
            resumes.len(),
            job.filename
        );

        let job_content = self.extractor.extract(job).await?;
        let job_vector = self.scorer.embed(&job_content.plain_text).await?;

        // futures built up front so the stream holds no borrowing closure
        let pending: Vec<_> = resumes
            .iter()
            .map(|resume| self.gather_evidence(resume, &job_vector))
            .collect();
        let candidates: Vec<CandidateEvidence> = stream::iter(pending)
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;
        debug!(
            "[{request_id}] Evidence ready for {} candidate(s) (embedding model: {})",
            candidates.len(),
            self.scorer.model_name()
        );

        let request = compose_ranking_request(&job_content, &candidates, self.evidence_mode);
        let raw = self.llm.generate(&request).await?;
        debug!("[{request_id}] LLM returned {} chars", raw.len());

        let result = normalize(validate_ranking(&raw, &candidates)?, &candidates);
        info!(
            "[{request_id}] Ranked {} candidate(s); top: {}",
            result.ranking.len(),
            result
                .ranking
                .first()
                .map(|c| c.resume_filename.as_str())
                .unwrap_or("-")
        );
        Ok(result)
    }

    async fn gather_evidence(
        &self,
        resume: &Document,
        job_vector: &[f32],
    ) -> Result<CandidateEvidence, AppError> {
        let content = self.extractor.extract(resume).await?;
        let score = self
            .scorer
            .score_against(job_vector, &content.plain_text)
            .await?;
        debug!("Scored '{}': {:.3}", resume.filename, score);
        Ok(CandidateEvidence {
            filename: resume.filename.clone(),
            resume_text: content.plain_text,
            sbert_score: round_score(score),
        })
    }
}

fn reject_duplicate_filenames(resumes: &[Document]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for resume in resumes {
        if !seen.insert(resume.filename.as_str()) {
            return Err(AppError::Validation(format!(
                "duplicate resume filename '{}'; filenames must be unique",
                resume.filename
            )));
        }
    }
    Ok(())
}

/// Pins each `sbert_score` to the locally measured value and orders entries
/// by `fitment_score`, best first. Ties keep the model's order.
fn normalize(mut result: RankingResult, candidates: &[CandidateEvidence]) -> RankingResult {
    let measured: HashMap<&str, f32> = candidates
        .iter()
        .map(|c| (c.filename.as_str(), c.sbert_score))
        .collect();
    for entry in &mut result.ranking {
        if let Some(score) = measured.get(entry.resume_filename.as_str()) {
            entry.sbert_score = *score;
        }
    }
    result
        .ranking
        .sort_by(|a, b| b.fitment_score.cmp(&a.fitment_score));
    result
}
