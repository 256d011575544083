//! The ranking output contract. The prompt renders it and the validator checks
//! against it, so field names exist in exactly one place.

pub const RANKING_FIELD: &str = "Ranking";
pub const SUMMARY_FIELD: &str = "Summary";

pub const FITMENT_MIN: i64 = 1;
pub const FITMENT_MAX: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// A string that may be omitted (or null on input).
    OptionalText,
    Number,
    Score { min: i64, max: i64 },
    Flag,
    /// Array of objects shaped by [`SKILL_GAP_FIELDS`].
    SkillGapTable,
    /// Object mapping names to booleans.
    FlagMap,
    TextList,
}

impl FieldKind {
    /// How the field is written in the prompt's schema block.
    pub fn shape(&self) -> String {
        match self {
            FieldKind::Text => "string".to_string(),
            FieldKind::OptionalText => "string (omit when not applicable)".to_string(),
            FieldKind::Number => "float".to_string(),
            FieldKind::Score { min, max } => format!("int ({min}-{max})"),
            FieldKind::Flag => "boolean".to_string(),
            FieldKind::SkillGapTable => {
                let columns: Vec<String> = SKILL_GAP_FIELDS
                    .iter()
                    .map(|f| format!("\"{}\": {}", f.name, f.kind.shape()))
                    .collect();
                format!("[ {{ {} }} ]", columns.join(", "))
            }
            FieldKind::FlagMap => "{ \"<skill name>\": boolean, ... }".to_string(),
            FieldKind::TextList => "[string, ...]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

/// Fields of one candidate object, in output order.
pub const CANDIDATE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        kind: FieldKind::Text,
        description: "candidate's full name as written in the resume",
    },
    FieldSpec {
        name: "sbert_score",
        kind: FieldKind::Number,
        description: "the SBERT score given with this resume",
    },
    FieldSpec {
        name: "fitment_score",
        kind: FieldKind::Score {
            min: FITMENT_MIN,
            max: FITMENT_MAX,
        },
        description: "overall fit for the role",
    },
    FieldSpec {
        name: "selection",
        kind: FieldKind::Flag,
        description: "true = selected, false = rejected",
    },
    FieldSpec {
        name: "rationale",
        kind: FieldKind::Text,
        description: "1-2 sentences explaining the decision",
    },
    FieldSpec {
        name: "skill_gap_table",
        kind: FieldKind::SkillGapTable,
        description: "one row per skill in the job description",
    },
    FieldSpec {
        name: "experience_summary",
        kind: FieldKind::Text,
        description: "total years, domains, tools and technologies",
    },
    FieldSpec {
        name: "skill_presence",
        kind: FieldKind::FlagMap,
        description: "key job skills mapped to whether the candidate has them",
    },
    FieldSpec {
        name: "suggested_domains",
        kind: FieldKind::TextList,
        description: "2-3 entries of the form \"<Domain>: <why it fits>\"",
    },
    FieldSpec {
        name: "resume_filename",
        kind: FieldKind::Text,
        description: "exact filename from the resume block",
    },
];

/// Columns of a skill-gap row.
pub const SKILL_GAP_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "skill",
        kind: FieldKind::Text,
        description: "skill name",
    },
    FieldSpec {
        name: "required",
        kind: FieldKind::Flag,
        description: "required by the job",
    },
    FieldSpec {
        name: "present",
        kind: FieldKind::Flag,
        description: "found in the resume",
    },
    FieldSpec {
        name: "depth",
        kind: FieldKind::OptionalText,
        description: "\"Expert\" | \"Proficient\" | \"Basic\"",
    },
];

/// Renders the JSON skeleton embedded in the ranking prompt.
pub fn render_schema() -> String {
    let mut out = String::from("{\n");
    out.push_str(&format!("  \"{RANKING_FIELD}\": [\n    {{\n"));
    for (i, field) in CANDIDATE_FIELDS.iter().enumerate() {
        let comma = if i + 1 < CANDIDATE_FIELDS.len() { "," } else { "" };
        out.push_str(&format!(
            "      \"{}\": {}{comma}    // {}\n",
            field.name,
            field.kind.shape(),
            field.description
        ));
    }
    out.push_str("    },\n    ...\n  ],\n");
    out.push_str(&format!(
        "  \"{SUMMARY_FIELD}\": string    // short comparison of the candidates\n}}"
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::models::fixtures::assessment;
    use crate::ranking::models::RankingResult;

    #[test]
    fn test_schema_names_match_serialized_assessment() {
        let value = serde_json::to_value(assessment("a.pdf", 8)).unwrap();
        let object = value.as_object().unwrap();
        let expected: Vec<&str> = CANDIDATE_FIELDS.iter().map(|f| f.name).collect();
        let mut actual: Vec<&str> = object.keys().map(String::as_str).collect();
        let mut sorted_expected = expected.clone();
        sorted_expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, sorted_expected);

        let row = object["skill_gap_table"][0].as_object().unwrap();
        for field in SKILL_GAP_FIELDS {
            assert!(row.contains_key(field.name), "missing {}", field.name);
        }
    }

    #[test]
    fn test_top_level_names_match_serialized_result() {
        let value = serde_json::to_value(RankingResult {
            ranking: vec![],
            summary: String::new(),
        })
        .unwrap();
        assert!(value.get(RANKING_FIELD).is_some());
        assert!(value.get(SUMMARY_FIELD).is_some());
    }

    #[test]
    fn test_render_schema_lists_every_field() {
        let schema = render_schema();
        for field in CANDIDATE_FIELDS.iter().chain(SKILL_GAP_FIELDS) {
            assert!(schema.contains(&format!("\"{}\"", field.name)), "{}", field.name);
        }
        assert!(schema.contains("int (1-10)"));
        assert!(schema.contains("\"Summary\""));
    }
}
