use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::EvidenceMode;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub llm_model: String,
    pub embedding_api_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub max_upload_bytes: usize,
    pub max_concurrent_extractions: usize,
    pub request_timeout: Duration,
    pub doc_converter: String,
    pub pdf_evidence_mode: EvidenceMode,
    pub port: u16,
    pub rust_log: String,
}

pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-mpnet-base-v2";
pub const DEFAULT_EMBEDDING_API_URL: &str = "http://localhost:7997/v1/embeddings";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_concurrent_extractions: usize = parse_env("MAX_CONCURRENT_EXTRACTIONS", 4)?;
        if max_concurrent_extractions == 0 {
            anyhow::bail!("MAX_CONCURRENT_EXTRACTIONS must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            embedding_api_url: env_or("EMBEDDING_API_URL", DEFAULT_EMBEDDING_API_URL),
            embedding_api_key: std::env::var("EMBEDDING_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            embedding_model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_concurrent_extractions,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 180)?),
            doc_converter: env_or("DOC_CONVERTER", "antiword"),
            pdf_evidence_mode: parse_env("PDF_EVIDENCE_MODE", EvidenceMode::Text)?,
            port: parse_env("PORT", 10000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            embedding_api_url: DEFAULT_EMBEDDING_API_URL.to_string(),
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_concurrent_extractions: 2,
            request_timeout: Duration::from_secs(30),
            doc_converter: "antiword".to_string(),
            pdf_evidence_mode: EvidenceMode::Text,
            port: 10000,
            rust_log: "info".to_string(),
        }
    }
}
