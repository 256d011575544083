use crate::ranking::models::{CandidateAssessment, RankingResult};

const TABLE_HEADERS: &[&str] = &["Rank", "Candidate Name", "Fitment Score", "Decision", "Notes"];

/// Replaces the summary with an HTML rendering of the ranking followed by the
/// original summary. The ranking itself is untouched.
pub fn format_ranking(mut result: RankingResult) -> RankingResult {
    let table = render_table(&result.ranking);
    result.summary = format!(
        "<div class=\"ranking-summary\">\n<h3>Ranked Candidates</h3>\n{table}\n<p><strong>Note:</strong> {}</p>\n</div>",
        escape_html(&result.summary)
    );
    result
}

fn render_table(ranking: &[CandidateAssessment]) -> String {
    let mut html = String::from("<table class=\"ranking-table\" border=\"1\">\n<thead><tr>");
    for header in TABLE_HEADERS {
        html.push_str(&format!("<th>{header}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (rank, candidate) in ranking.iter().enumerate() {
        let decision = if candidate.selection {
            "\u{2705} Selected"
        } else {
            "\u{274C} Rejected"
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{} / 10</td><td>{decision}</td><td>{}</td></tr>\n",
            rank + 1,
            escape_html(&candidate.name),
            candidate.fitment_score,
            escape_html(&candidate.rationale),
        ));
    }

    html.push_str("</tbody>\n</table>");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::models::fixtures::assessment;

    fn ranking() -> RankingResult {
        RankingResult {
            ranking: vec![assessment("alice.pdf", 9), assessment("bob.docx", 4)],
            summary: "Alice leads on Python & APIs".to_string(),
        }
    }

    #[test]
    fn test_table_has_a_row_per_candidate_in_rank_order() {
        let formatted = format_ranking(ranking());
        let summary = &formatted.summary;

        assert!(summary.contains("<table"));
        assert_eq!(summary.matches("<tr><td>").count(), 2);
        let alice = summary.find("Candidate alice.pdf").unwrap();
        let bob = summary.find("Candidate bob.docx").unwrap();
        assert!(alice < bob);
        assert!(summary.contains("<td>1</td>"));
        assert!(summary.contains("9 / 10"));
        assert!(summary.contains("\u{2705} Selected"));
        assert!(summary.contains("\u{274C} Rejected"));
    }

    #[test]
    fn test_ranking_entries_are_not_modified() {
        let original = ranking();
        let formatted = format_ranking(original.clone());
        assert_eq!(formatted.ranking, original.ranking);
        assert!(formatted.summary.contains("Alice leads on Python &amp; APIs"));
    }

    #[test]
    fn test_model_text_is_escaped() {
        let mut result = ranking();
        result.ranking[0].rationale = "<script>alert('x')</script>".to_string();
        let formatted = format_ranking(result);
        assert!(!formatted.summary.contains("<script>"));
        assert!(formatted
            .summary
            .contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }
}
