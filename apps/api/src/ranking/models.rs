use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One resume's evidence for the ranking prompt. Filenames are unique per request.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEvidence {
    pub filename: String,
    pub resume_text: String,
    /// Cosine similarity to the job description, rounded to 3 places.
    pub sbert_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapRow {
    pub skill: String,
    pub required: bool,
    pub present: bool,
    /// "Expert" | "Proficient" | "Basic"; absent when the skill is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAssessment {
    pub name: String,
    pub sbert_score: f32,
    pub fitment_score: u8,
    pub selection: bool,
    pub rationale: String,
    pub skill_gap_table: Vec<SkillGapRow>,
    pub experience_summary: String,
    pub skill_presence: BTreeMap<String, bool>,
    /// Each entry carries its own justification, e.g. "BFSI: built payment APIs".
    pub suggested_domains: Vec<String>,
    pub resume_filename: String,
}

/// Ranked assessments, best fit first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    #[serde(rename = "Ranking")]
    pub ranking: Vec<CandidateAssessment>,
    #[serde(rename = "Summary")]
    pub summary: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn assessment(filename: &str, fitment_score: u8) -> CandidateAssessment {
        CandidateAssessment {
            name: format!("Candidate {filename}"),
            sbert_score: 0.5,
            fitment_score,
            selection: fitment_score >= 7,
            rationale: format!("Rationale for {filename}"),
            skill_gap_table: vec![
                SkillGapRow {
                    skill: "Python".to_string(),
                    required: true,
                    present: true,
                    depth: Some("Expert".to_string()),
                },
                SkillGapRow {
                    skill: "Kubernetes".to_string(),
                    required: false,
                    present: false,
                    depth: None,
                },
            ],
            experience_summary: "5 years backend development".to_string(),
            skill_presence: BTreeMap::from([
                ("Python".to_string(), true),
                ("Kubernetes".to_string(), false),
            ]),
            suggested_domains: vec![
                "BFSI: payment API experience".to_string(),
                "E-Commerce: high-traffic REST services".to_string(),
            ],
            resume_filename: filename.to_string(),
        }
    }
}
