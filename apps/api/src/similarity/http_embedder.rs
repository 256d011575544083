use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbeddingError};

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint serving a
/// sentence-transformers model (e.g. Infinity or text-embeddings-inference).
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(url: String, api_key: Option<String>, model: String) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: [text],
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        let embedding = parse_single(body)?;
        debug!(
            "Embedded {} chars into {} dimensions",
            text.len(),
            embedding.len()
        );
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn parse_single(body: EmbeddingResponse) -> Result<Vec<f32>, EmbeddingError> {
    let embedding = body
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| EmbeddingError::Malformed("response contained no embeddings".to_string()))?;
    if embedding.is_empty() {
        return Err(EmbeddingError::Malformed("embedding vector is empty".to_string()));
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::{DEFAULT_EMBEDDING_API_URL, DEFAULT_EMBEDDING_MODEL};
    use crate::similarity::SimilarityScorer;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(EmbeddingRequest {
            model: "all-mpnet-base-v2",
            input: ["hello"],
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "all-mpnet-base-v2", "input": ["hello"]})
        );
    }

    #[test]
    fn test_parse_single_takes_first_embedding() {
        let body: EmbeddingResponse = serde_json::from_str(
            r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2]}],"model":"m"}"#,
        )
        .unwrap();
        assert_eq!(parse_single(body).unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_parse_single_rejects_empty_data() {
        let body: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(parse_single(body), Err(EmbeddingError::Malformed(_))));
    }

    /// Needs a running embedding server at EMBEDDING_API_URL.
    #[tokio::test]
    #[ignore]
    async fn test_live_python_backend_scenario_scores_above_half() {
        let url = std::env::var("EMBEDDING_API_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_API_URL.to_string());
        let embedder =
            HttpEmbedder::new(url, None, DEFAULT_EMBEDDING_MODEL.to_string()).unwrap();
        let scorer = SimilarityScorer::new(Arc::new(embedder));
        let score = scorer
            .score(
                "Seeking Python backend engineer, 3+ years, REST APIs",
                "5 years Python, built REST APIs at two companies",
            )
            .await
            .unwrap();
        assert!(score > 0.5, "score was {score}");
    }
}
