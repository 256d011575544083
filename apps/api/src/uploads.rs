use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;
use tempfile::TempDir;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::Document;

const FALLBACK_FILENAME: &str = "upload";

/// One file part of a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub bytes: Bytes,
}

/// Reads every file part. Parts with neither a filename nor content (an empty
/// file input) are skipped.
pub async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read field '{name}': {e}")))?;

        if filename.is_empty() && bytes.is_empty() {
            continue;
        }
        debug!("Received '{filename}' in field '{name}' ({} bytes)", bytes.len());
        files.push(UploadedFile {
            field: name,
            filename,
            bytes,
        });
    }
    Ok(files)
}

/// Uploads written to a temp directory that lives as long as this value.
pub struct StagedUploads {
    // removed on drop
    _dir: TempDir,
    staged: Vec<(String, Document)>,
}

impl StagedUploads {
    pub async fn stage(files: Vec<UploadedFile>) -> Result<Self, AppError> {
        let dir = TempDir::new().map_err(anyhow::Error::from)?;
        let mut staged = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            let filename = sanitize_filename(&file.filename);
            // prefix keeps two identical names from colliding on disk
            let path = dir.path().join(format!("{index}_{filename}"));
            tokio::fs::write(&path, &file.bytes)
                .await
                .map_err(anyhow::Error::from)?;
            staged.push((file.field, Document::new(path, filename)));
        }

        Ok(Self { _dir: dir, staged })
    }

    /// First document uploaded under `field`.
    pub fn first(&self, field: &str) -> Option<&Document> {
        self.staged
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, doc)| doc)
    }

    /// All documents uploaded under `field`, in upload order.
    pub fn all(&self, field: &str) -> Vec<Document> {
        self.staged
            .iter()
            .filter(|(name, _)| name == field)
            .map(|(_, doc)| doc.clone())
            .collect()
    }
}

/// Keeps only the final path component of a client-supplied filename.
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    match Path::new(last).file_name().and_then(|n| n.to_str()) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => FALLBACK_FILENAME.to_string(),
    }
}
