// Single-resume assessment prompt. Output is free text for a human reader.

use crate::extraction::{EvidenceMode, ExtractedContent};
use crate::llm_client::prompts::{EVALUATOR_PERSONA, SIMILARITY_EVIDENCE_INSTRUCTION};
use crate::llm_client::{ContentPart, LlmRequest};

pub const ASSESSMENT_PROMPT: &str = r#"Analyze the candidate's resume (above) against the job description (below) and report:

1. Fitment Score (1-10), based on skills, experience and qualifications match.
2. Selection: "✅ Selected" or "❌ Rejected", with 1-2 sentences explaining the decision.
3. Skill Gap Analysis: count required skills present vs. missing and rate present skills as Expert, Proficient or Basic.
4. Relevant Experience Summary: total years, domains, tools and technologies used.
5. Skill Presence: key job skills marked ✔️ if present and ❌ if not.
6. Suggested Domains (if selected): 2-3 IT service domains (for example BFSI, E-Commerce) with a 1-line reason each.

{similarity_instruction}
SBERT similarity score for this pair: {score}

Response format:
1. Fitment Score:
2. Selection:
3. Rationale:
4. Skill Gap Table:
| Skill | Required? | Present? | Depth |
5. Experience Summary:
6. Skill Presence:
7. Recommended Domains:"#;

const RESUME_HEADER: &str = "=== RESUME ===";
const JOB_DESCRIPTION_HEADER: &str = "=== JOB DESCRIPTION ===";

/// Resume first, then instructions, then the job description. PDFs go as
/// native documents under `EvidenceMode::Attachment`.
pub fn compose_single_request(
    resume: &ExtractedContent,
    job: &ExtractedContent,
    sbert_score: f32,
    mode: EvidenceMode,
) -> LlmRequest {
    let instructions = ASSESSMENT_PROMPT
        .replace("{similarity_instruction}", SIMILARITY_EVIDENCE_INSTRUCTION)
        .replace("{score}", &format!("{sbert_score:.3}"));

    let mut parts = Vec::with_capacity(5);
    push_evidence(&mut parts, RESUME_HEADER, resume, mode);
    parts.push(ContentPart::Text(instructions));
    push_evidence(&mut parts, JOB_DESCRIPTION_HEADER, job, mode);

    LlmRequest {
        system: EVALUATOR_PERSONA.to_string(),
        parts,
    }
}

fn push_evidence(
    parts: &mut Vec<ContentPart>,
    header: &str,
    content: &ExtractedContent,
    mode: EvidenceMode,
) {
    match content.attachment_for(mode) {
        Some(attachment) => {
            parts.push(ContentPart::Text(header.to_string()));
            parts.push(ContentPart::Document {
                media_type: attachment.media_type.to_string(),
                data: attachment.bytes.clone(),
            });
        }
        None => parts.push(ContentPart::Text(format!("{header}\n{}", content.plain_text))),
    }
}
