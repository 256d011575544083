use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm_client::strip_json_fences;
use crate::ranking::models::{CandidateEvidence, RankingResult};
use crate::ranking::schema::{
    FieldKind, FieldSpec, CANDIDATE_FIELDS, RANKING_FIELD, SKILL_GAP_FIELDS, SUMMARY_FIELD,
};

/// Both variants carry the raw model output so callers can surface it.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("LLM output is not valid JSON: {reason}")]
    InvalidJson { reason: String, raw: String },

    #[error("LLM output does not match the ranking schema: {reason}")]
    SchemaMismatch { reason: String, raw: String },
}

/// Parses and checks the model's ranking output against the schema table and
/// the submitted resumes. Unknown extra fields are ignored.
pub fn validate_ranking(
    raw: &str,
    submitted: &[CandidateEvidence],
) -> Result<RankingResult, ValidationError> {
    let mismatch = |reason: String| ValidationError::SchemaMismatch {
        reason,
        raw: raw.to_string(),
    };

    let value: Value =
        serde_json::from_str(strip_json_fences(raw)).map_err(|e| ValidationError::InvalidJson {
            reason: e.to_string(),
            raw: raw.to_string(),
        })?;

    let object = value
        .as_object()
        .ok_or_else(|| mismatch("top-level value is not an object".to_string()))?;

    let entries = match object.get(RANKING_FIELD) {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(mismatch(format!("\"{RANKING_FIELD}\" must be an array"))),
        None => return Err(mismatch(format!("missing \"{RANKING_FIELD}\""))),
    };
    match object.get(SUMMARY_FIELD) {
        Some(Value::String(_)) => {}
        Some(_) => return Err(mismatch(format!("\"{SUMMARY_FIELD}\" must be a string"))),
        None => return Err(mismatch(format!("missing \"{SUMMARY_FIELD}\""))),
    }

    if entries.len() != submitted.len() {
        return Err(mismatch(format!(
            "expected {} ranked candidates, got {}",
            submitted.len(),
            entries.len()
        )));
    }

    for (i, entry) in entries.iter().enumerate() {
        check_object(entry, CANDIDATE_FIELDS, &format!("{RANKING_FIELD}[{i}]")).map_err(mismatch)?;
    }

    let result: RankingResult =
        serde_json::from_value(value.clone()).map_err(|e| mismatch(e.to_string()))?;

    let known: HashSet<&str> = submitted.iter().map(|c| c.filename.as_str()).collect();
    let mut seen = HashSet::new();
    for entry in &result.ranking {
        let filename = entry.resume_filename.as_str();
        if !known.contains(filename) {
            return Err(mismatch(format!("unknown resume_filename \"{filename}\"")));
        }
        if !seen.insert(filename) {
            return Err(mismatch(format!("resume_filename \"{filename}\" ranked twice")));
        }
    }

    Ok(result)
}

fn check_object(value: &Value, fields: &[FieldSpec], path: &str) -> Result<(), String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("{path} must be an object"))?;
    for field in fields {
        check_field(object, field, path)?;
    }
    Ok(())
}

fn check_field(object: &Map<String, Value>, field: &FieldSpec, path: &str) -> Result<(), String> {
    let at = format!("{path}.{}", field.name);
    let value = match object.get(field.name) {
        None | Some(Value::Null) if field.kind == FieldKind::OptionalText => return Ok(()),
        None => return Err(format!("missing {at}")),
        Some(Value::Null) => return Err(format!("{at} is null")),
        Some(value) => value,
    };

    let well_typed = match field.kind {
        FieldKind::Text | FieldKind::OptionalText => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Flag => value.is_boolean(),
        FieldKind::Score { min, max } => {
            let score = value
                .as_i64()
                .ok_or_else(|| format!("{at} must be an integer"))?;
            if score < min || score > max {
                return Err(format!("{at} is {score}, outside {min}-{max}"));
            }
            true
        }
        FieldKind::SkillGapTable => {
            let rows = value
                .as_array()
                .ok_or_else(|| format!("{at} must be an array"))?;
            for (i, row) in rows.iter().enumerate() {
                check_object(row, SKILL_GAP_FIELDS, &format!("{at}[{i}]"))?;
            }
            true
        }
        FieldKind::FlagMap => value
            .as_object()
            .is_some_and(|map| map.values().all(Value::is_boolean)),
        FieldKind::TextList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
    };

    if well_typed {
        Ok(())
    } else {
        Err(format!("{at} must be {}", field.kind.shape()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ranking::models::fixtures::assessment;

    fn submitted(names: &[&str]) -> Vec<CandidateEvidence> {
        names
            .iter()
            .map(|name| CandidateEvidence {
                filename: name.to_string(),
                resume_text: format!("resume {name}"),
                sbert_score: 0.5,
            })
            .collect()
    }

    fn output(entries: Vec<Value>) -> String {
        json!({ "Ranking": entries, "Summary": "a is stronger" }).to_string()
    }

    fn entry(filename: &str, fitment: u8) -> Value {
        serde_json::to_value(assessment(filename, fitment)).unwrap()
    }

    #[test]
    fn test_accepts_well_formed_output() {
        let raw = output(vec![entry("a.pdf", 9), entry("b.docx", 3)]);
        let result = validate_ranking(&raw, &submitted(&["a.pdf", "b.docx"])).unwrap();
        assert_eq!(result.ranking.len(), 2);
        assert_eq!(result.ranking[0], assessment("a.pdf", 9));
        assert_eq!(result.summary, "a is stronger");
    }

    #[test]
    fn test_accepts_fenced_output() {
        let raw = format!("```json\n{}\n```", output(vec![entry("a.pdf", 9)]));
        assert!(validate_ranking(&raw, &submitted(&["a.pdf"])).is_ok());
    }

    #[test]
    fn test_prose_is_invalid_json_and_keeps_raw() {
        let raw = "I'm sorry, I cannot rank these candidates.";
        match validate_ranking(raw, &submitted(&["a.pdf"])) {
            Err(ValidationError::InvalidJson { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_entry_count_is_schema_mismatch() {
        let raw = output(vec![entry("a.pdf", 9)]);
        let err = validate_ranking(&raw, &submitted(&["a.pdf", "b.docx"])).unwrap_err();
        assert!(matches!(err, ValidationError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn test_missing_summary_is_schema_mismatch() {
        let raw = json!({ "Ranking": [entry("a.pdf", 9)] }).to_string();
        let err = validate_ranking(&raw, &submitted(&["a.pdf"])).unwrap_err();
        assert!(err.to_string().contains("Summary"));
    }

    #[test]
    fn test_fitment_out_of_range_is_rejected() {
        let mut bad = entry("a.pdf", 9);
        bad["fitment_score"] = json!(11);
        let err = validate_ranking(&output(vec![bad]), &submitted(&["a.pdf"])).unwrap_err();
        assert!(err.to_string().contains("outside 1-10"));
    }

    #[test]
    fn test_null_required_field_is_rejected() {
        let mut bad = entry("a.pdf", 9);
        bad["rationale"] = Value::Null;
        let err = validate_ranking(&output(vec![bad]), &submitted(&["a.pdf"])).unwrap_err();
        assert!(err.to_string().contains("Ranking[0].rationale is null"));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut bad = entry("a.pdf", 9);
        bad.as_object_mut().unwrap().remove("skill_presence");
        let err = validate_ranking(&output(vec![bad]), &submitted(&["a.pdf"])).unwrap_err();
        assert!(err.to_string().contains("missing Ranking[0].skill_presence"));
    }

    #[test]
    fn test_skill_gap_row_types_are_checked() {
        let mut bad = entry("a.pdf", 9);
        bad["skill_gap_table"][0]["present"] = json!("yes");
        let err = validate_ranking(&output(vec![bad]), &submitted(&["a.pdf"])).unwrap_err();
        assert!(err
            .to_string()
            .contains("Ranking[0].skill_gap_table[0].present"));
    }

    #[test]
    fn test_null_depth_is_allowed() {
        let mut ok = entry("a.pdf", 9);
        ok["skill_gap_table"][1]["depth"] = Value::Null;
        assert!(validate_ranking(&output(vec![ok]), &submitted(&["a.pdf"])).is_ok());
    }

    #[test]
    fn test_unknown_and_duplicate_filenames_are_rejected() {
        let unknown = output(vec![entry("a.pdf", 9), entry("c.pdf", 3)]);
        let err = validate_ranking(&unknown, &submitted(&["a.pdf", "b.docx"])).unwrap_err();
        assert!(err.to_string().contains("unknown resume_filename \"c.pdf\""));

        let twice = output(vec![entry("a.pdf", 9), entry("a.pdf", 3)]);
        let err = validate_ranking(&twice, &submitted(&["a.pdf", "b.docx"])).unwrap_err();
        assert!(err.to_string().contains("ranked twice"));
    }

    #[test]
    fn test_non_object_top_level_is_schema_mismatch() {
        let err = validate_ranking("[1, 2]", &submitted(&["a.pdf"])).unwrap_err();
        assert!(matches!(err, ValidationError::SchemaMismatch { .. }));
    }
}
