//! Single-resume assessment: one similarity score plus a free-text LLM report.

pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{Document, EvidenceMode, Extractor};
use crate::llm_client::TextGenerator;
use crate::similarity::{round_score, SimilarityScorer};

use prompts::compose_single_request;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleAssessment {
    pub sbert_score: f32,
    pub llm_assessment: String,
}

pub struct SingleAssessor {
    extractor: Extractor,
    scorer: SimilarityScorer,
    llm: Arc<dyn TextGenerator>,
    evidence_mode: EvidenceMode,
}

impl SingleAssessor {
    pub fn new(
        extractor: Extractor,
        scorer: SimilarityScorer,
        llm: Arc<dyn TextGenerator>,
        evidence_mode: EvidenceMode,
    ) -> Self {
        Self {
            extractor,
            scorer,
            llm,
            evidence_mode,
        }
    }

    pub async fn assess(
        &self,
        resume: Option<&Document>,
        job: Option<&Document>,
    ) -> Result<SingleAssessment, AppError> {
        let (resume, job) = match (resume, job) {
            (Some(resume), Some(job)) => (resume, job),
            _ => {
                return Err(AppError::MissingInput(
                    "both 'resume' and 'job' files are required".to_string(),
                ))
            }
        };

        let (resume_content, job_content) =
            tokio::try_join!(self.extractor.extract(resume), self.extractor.extract(job))?;

        let score = round_score(
            self.scorer
                .score(&resume_content.plain_text, &job_content.plain_text)
                .await?,
        );
        info!("Assessing '{}' against '{}' (sbert {score:.3})", resume.filename, job.filename);

        let request =
            compose_single_request(&resume_content, &job_content, score, self.evidence_mode);
        let llm_assessment = self.llm.generate(&request).await?;

        Ok(SingleAssessment {
            sbert_score: score,
            llm_assessment,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::extraction::fixtures::simple_docx;
    use crate::extraction::DocConverter;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::similarity::testing::BagOfWordsEmbedder;

    fn stage(dir: &TempDir, name: &str, bytes: &[u8]) -> Document {
        let path = dir.path().join(name);
        std::fs::File::create(&path).unwrap().write_all(bytes).unwrap();
        Document::new(path, name)
    }

    fn assessor(llm: Arc<ScriptedGenerator>) -> SingleAssessor {
        SingleAssessor::new(
            Extractor::new(DocConverter::new("antiword")),
            SimilarityScorer::new(Arc::new(BagOfWordsEmbedder)),
            llm,
            EvidenceMode::Text,
        )
    }

    #[tokio::test]
    async fn test_assess_returns_score_and_llm_text() {
        let dir = TempDir::new().unwrap();
        let resume = stage(&dir, "cv.docx", &simple_docx("Python backend engineer"));
        let job = stage(&dir, "jd.docx", &simple_docx("Python backend engineer"));
        let llm = Arc::new(ScriptedGenerator::replying("1. Fitment Score: 9"));

        let result = assessor(llm.clone())
            .assess(Some(&resume), Some(&job))
            .await
            .unwrap();

        assert_eq!(result.sbert_score, 1.0);
        assert_eq!(result.llm_assessment, "1. Fitment Score: 9");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let resume = stage(&dir, "cv.docx", &simple_docx("Python"));
        let llm = Arc::new(ScriptedGenerator::replying("unused"));

        let err = assessor(llm.clone())
            .assess(Some(&resume), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));
        assert_eq!(llm.calls(), 0);
    }
}
