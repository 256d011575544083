// Ranking prompt templates and the composer that assembles one ranking request.

use crate::extraction::{EvidenceMode, ExtractedContent};
use crate::llm_client::prompts::{EVALUATOR_PERSONA, JSON_ONLY_SYSTEM, SIMILARITY_EVIDENCE_INSTRUCTION};
use crate::llm_client::{ContentPart, LlmRequest};
use crate::ranking::models::CandidateEvidence;
use crate::ranking::schema::render_schema;

pub const RESUME_START: &str = "--- RESUME START ---";
pub const RESUME_END: &str = "--- RESUME END ---";

pub const RANKING_PROMPT: &str = r#"You are given one job description and {count} resume(s). Assess every candidate against the job, rank them from most to least suitable, and return ONE JSON object.

For each candidate assess:
1. Fitment score: an integer from 1 to 10 reflecting how well skills, experience and qualifications match the job.
2. Selection: true if the candidate should be selected, false if rejected, with a 1-2 sentence rationale.
3. Skill gap analysis: every skill the job requires or mentions, whether it is required, whether the candidate has it, and for skills the candidate has, the depth ("Expert", "Proficient" or "Basic").
4. Relevant experience summary: total years, domains worked in, and tools or technologies used.
5. Skill presence: each key skill from the job description mapped to true or false.
6. Suggested domains: 2-3 IT service domains (for example BFSI, E-Commerce, Healthcare, Telecom) where this candidate would fit. Each entry names the domain and gives a 1-2 line reason in the same string.

{similarity_instruction}

OUTPUT SCHEMA (field names are exact):
{schema}

RULES:
1. "Ranking" MUST contain exactly {count} objects, one for each submitted resume. Do not skip or merge candidates.
2. "resume_filename" MUST be copied verbatim from the "Resume Filename:" line of the candidate's resume block. Submitted filenames: {filenames}
3. Order "Ranking" from best fit to worst fit.
4. Copy each candidate's SBERT score into "sbert_score".
5. Never output null. Omit "depth" for skills the candidate does not have.
6. Return ONLY the JSON object."#;

const JOB_DESCRIPTION_HEADER: &str = "=== JOB DESCRIPTION ===";
const JOB_DESCRIPTION_ATTACHED: &str =
    "=== JOB DESCRIPTION ===\nThe job description is the attached document.";
const RESUMES_HEADER: &str = "=== RESUMES ===";

/// Builds the single ranking request: instructions, job description, then one
/// delimited block per resume in submission order.
pub fn compose_ranking_request(
    job: &ExtractedContent,
    candidates: &[CandidateEvidence],
    mode: EvidenceMode,
) -> LlmRequest {
    let filenames = candidates
        .iter()
        .map(|c| format!("\"{}\"", c.filename))
        .collect::<Vec<_>>()
        .join(", ");

    let instructions = RANKING_PROMPT
        .replace("{similarity_instruction}", SIMILARITY_EVIDENCE_INSTRUCTION)
        .replace("{schema}", &render_schema())
        .replace("{count}", &candidates.len().to_string())
        .replace("{filenames}", &filenames);

    let mut parts = vec![ContentPart::Text(instructions)];

    match job.attachment_for(mode) {
        Some(attachment) => {
            parts.push(ContentPart::Text(JOB_DESCRIPTION_ATTACHED.to_string()));
            parts.push(ContentPart::Document {
                media_type: attachment.media_type.to_string(),
                data: attachment.bytes.clone(),
            });
        }
        None => parts.push(ContentPart::Text(format!(
            "{JOB_DESCRIPTION_HEADER}\n{}",
            job.plain_text
        ))),
    }

    parts.push(ContentPart::Text(RESUMES_HEADER.to_string()));
    parts.extend(candidates.iter().map(|c| ContentPart::Text(resume_block(c))));

    LlmRequest {
        system: format!("{EVALUATOR_PERSONA} {JSON_ONLY_SYSTEM}"),
        parts,
    }
}

fn resume_block(candidate: &CandidateEvidence) -> String {
    format!(
        "{RESUME_START}\nResume Filename: {}\nSBERT Score: {:.3}\n\n{}\n{RESUME_END}",
        candidate.filename, candidate.sbert_score, candidate.resume_text
    )
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::extraction::{Attachment, PDF_MEDIA_TYPE};

    fn job_text() -> ExtractedContent {
        ExtractedContent {
            plain_text: "Seeking Python backend engineer".to_string(),
            attachment: None,
        }
    }

    fn candidates() -> Vec<CandidateEvidence> {
        vec![
            CandidateEvidence {
                filename: "alice.pdf".to_string(),
                resume_text: "Alice: 6 years Python".to_string(),
                sbert_score: 0.8125,
            },
            CandidateEvidence {
                filename: "bob.docx".to_string(),
                resume_text: "Bob: Java developer".to_string(),
                sbert_score: 0.41,
            },
        ]
    }

    #[test]
    fn test_every_resume_gets_a_delimited_block_in_order() {
        let request = compose_ranking_request(&job_text(), &candidates(), EvidenceMode::Text);
        let text = request.text();

        assert_eq!(text.matches(RESUME_START).count(), 2);
        assert_eq!(text.matches(RESUME_END).count(), 2);
        let alice = text.find("Resume Filename: alice.pdf").unwrap();
        let bob = text.find("Resume Filename: bob.docx").unwrap();
        assert!(alice < bob);
        assert!(text.contains("SBERT Score: 0.812") || text.contains("SBERT Score: 0.813"));
        assert!(text.contains("SBERT Score: 0.410"));
    }

    #[test]
    fn test_instructions_state_count_schema_and_filenames() {
        let request = compose_ranking_request(&job_text(), &candidates(), EvidenceMode::Text);
        let text = request.text();

        assert!(text.contains("exactly 2 objects"));
        assert!(text.contains("\"alice.pdf\", \"bob.docx\""));
        assert!(text.contains("\"fitment_score\": int (1-10)"));
        assert!(text.contains("Seeking Python backend engineer"));
        assert!(!text.contains("{schema}"));
        assert!(request.system.contains("valid JSON only"));
    }

    #[test]
    fn test_attachment_mode_sends_pdf_job_description_as_document() {
        let job = ExtractedContent {
            plain_text: "extracted jd text".to_string(),
            attachment: Some(Attachment {
                media_type: PDF_MEDIA_TYPE,
                bytes: Bytes::from_static(b"%PDF-1.4 jd"),
            }),
        };
        let request = compose_ranking_request(&job, &candidates(), EvidenceMode::Attachment);

        let documents: Vec<_> = request
            .parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Document { .. }))
            .collect();
        assert_eq!(documents.len(), 1);
        assert!(!request.text().contains("extracted jd text"));

        let text_mode = compose_ranking_request(&job, &candidates(), EvidenceMode::Text);
        assert!(text_mode.text().contains("extracted jd text"));
        assert!(text_mode
            .parts
            .iter()
            .all(|p| matches!(p, ContentPart::Text(_))));
    }
}
