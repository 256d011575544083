//! Turns uploaded PDF, DOCX and legacy DOC files into plain text.
//!
//! Format is resolved from the file content first and the declared extension second,
//! into the closed [`DocumentFormat`] enum. Parsing of PDF and DOCX is CPU-bound and
//! runs on the blocking pool; legacy DOC goes through an external converter process.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

mod doc;
mod docx;
mod pdf;

pub use doc::DocConverter;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const DOCX_MAIN_PART: &[u8] = b"word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("no readable text found in '{filename}'")]
    Empty { filename: String },

    #[error("could not read PDF '{filename}': {reason}")]
    Pdf { filename: String, reason: String },

    #[error("could not read DOCX '{filename}': {reason}")]
    Docx { filename: String, reason: String },

    #[error("could not convert DOC '{filename}': {reason}")]
    Conversion { filename: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The closed set of formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
}

impl DocumentFormat {
    /// Recognises a format from leading bytes alone.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(ZIP_MAGIC) && contains(bytes, DOCX_MAIN_PART) {
            Some(DocumentFormat::Docx)
        } else if bytes.starts_with(OLE_MAGIC) {
            Some(DocumentFormat::Doc)
        } else {
            None
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            _ => None,
        }
    }

    /// Content sniffing wins; the declared extension is the fallback.
    pub fn resolve(bytes: &[u8], declared_extension: Option<&str>) -> Result<Self, ExtractionError> {
        if let Some(format) = Self::sniff(bytes) {
            return Ok(format);
        }
        match declared_extension {
            Some(ext) => Self::from_extension(ext).ok_or_else(|| ExtractionError::UnsupportedFormat {
                extension: format!(".{}", ext.to_ascii_lowercase()),
            }),
            None => Err(ExtractionError::UnsupportedFormat {
                extension: "<none>".to_string(),
            }),
        }
    }

    fn failure(self, filename: &str, reason: String) -> ExtractionError {
        let filename = filename.to_string();
        match self {
            DocumentFormat::Pdf => ExtractionError::Pdf { filename, reason },
            DocumentFormat::Docx => ExtractionError::Docx { filename, reason },
            DocumentFormat::Doc => ExtractionError::Conversion { filename, reason },
        }
    }
}

/// How a document with a native attachment form is handed to the LLM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvidenceMode {
    /// Send the extracted text.
    #[default]
    Text,
    /// Send the original bytes as a document block when the format has one (PDF only).
    Attachment,
}

impl FromStr for EvidenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(EvidenceMode::Text),
            "attachment" | "native" => Ok(EvidenceMode::Attachment),
            other => Err(format!("expected 'text' or 'attachment', got '{other}'")),
        }
    }
}

/// An uploaded file staged on disk for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub filename: String,
    pub declared_extension: Option<String>,
}

impl Document {
    pub fn new(path: PathBuf, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let declared_extension = Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);
        Self {
            path,
            filename,
            declared_extension,
        }
    }
}

/// Raw bytes of a document in a form an LLM can ingest directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub media_type: &'static str,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Never empty, trimmed.
    pub plain_text: String,
    pub attachment: Option<Attachment>,
}

impl ExtractedContent {
    /// The attachment to send under `mode`, if any.
    pub fn attachment_for(&self, mode: EvidenceMode) -> Option<&Attachment> {
        match mode {
            EvidenceMode::Text => None,
            EvidenceMode::Attachment => self.attachment.as_ref(),
        }
    }
}

/// Shared, stateless document extractor.
#[derive(Debug, Clone)]
pub struct Extractor {
    doc_converter: DocConverter,
}

impl Extractor {
    pub fn new(doc_converter: DocConverter) -> Self {
        Self { doc_converter }
    }

    pub async fn extract(&self, document: &Document) -> Result<ExtractedContent, ExtractionError> {
        let bytes = Bytes::from(tokio::fs::read(&document.path).await?);
        let format = DocumentFormat::resolve(&bytes, document.declared_extension.as_deref())?;
        debug!(
            "Extracting '{}' as {:?} ({} bytes)",
            document.filename,
            format,
            bytes.len()
        );

        let raw_text = match format {
            DocumentFormat::Pdf => {
                let data = bytes.clone();
                let name = document.filename.clone();
                run_blocking(format, &document.filename, move || pdf::extract_text(&name, &data))
                    .await?
            }
            DocumentFormat::Docx => {
                let data = bytes.clone();
                let name = document.filename.clone();
                run_blocking(format, &document.filename, move || docx::extract_text(&name, &data))
                    .await?
            }
            DocumentFormat::Doc => {
                self.doc_converter
                    .convert(&document.filename, &document.path, &bytes)
                    .await?
            }
        };

        let plain_text = raw_text.trim().to_string();
        if plain_text.is_empty() {
            return Err(ExtractionError::Empty {
                filename: document.filename.clone(),
            });
        }

        let attachment = match format {
            DocumentFormat::Pdf => Some(Attachment {
                media_type: PDF_MEDIA_TYPE,
                bytes,
            }),
            DocumentFormat::Docx | DocumentFormat::Doc => None,
        };

        Ok(ExtractedContent {
            plain_text,
            attachment,
        })
    }
}

/// Runs a parser on the blocking pool. A panicking parser becomes an extraction error.
async fn run_blocking<F>(
    format: DocumentFormat,
    filename: &str,
    job: F,
) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| format.failure(filename, format!("parser aborted: {e}")))?
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
