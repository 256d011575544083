//! Cosine similarity between embeddings from an external sentence-transformers model.
//!
//! The embedding backend is a trait so the HTTP client can be swapped for a test
//! double. `AppState` carries one shared `Arc<dyn Embedder>`; it is read-only.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod http_embedder;

pub use http_embedder::HttpEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("embedding dimensions differ ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("embedding model returned a zero vector")]
    ZeroVector,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encodes `text` into a fixed-dimensional vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn model_name(&self) -> &str;
}

/// Cosine similarity of two vectors: `dot(a, b) / (|a| * |b|)`, clamped to [-1, 1].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(EmbeddingError::ZeroVector);
    }
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Rounds a similarity score to 3 decimal places for display and LLM evidence.
pub fn round_score(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}

/// Scores text pairs against each other. Cheap to clone; no caching between calls.
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embeds non-empty text. Empty or whitespace-only input is always `EmptyInput`.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        self.embedder.embed(text).await
    }

    pub async fn score(&self, text_a: &str, text_b: &str) -> Result<f32, EmbeddingError> {
        let a = self.embed(text_a).await?;
        let b = self.embed(text_b).await?;
        cosine_similarity(&a, &b)
    }

    /// Scores `text` against an already-embedded reference (the job description).
    pub async fn score_against(&self, reference: &[f32], text: &str) -> Result<f32, EmbeddingError> {
        let v = self.embed(text).await?;
        cosine_similarity(reference, &v)
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }
}
