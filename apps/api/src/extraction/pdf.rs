use super::ExtractionError;

/// Extracts the text of every page in order, one page per line block.
/// Pages with no text are skipped.
pub(super) fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        let reason = e.to_string();
        let reason = if reason.contains("password") || reason.contains("encrypted") {
            format!("document is password protected ({reason})")
        } else {
            reason
        };
        ExtractionError::Pdf {
            filename: filename.to_string(),
            reason,
        }
    })?;

    Ok(join_pages(&pages))
}

fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref().trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
