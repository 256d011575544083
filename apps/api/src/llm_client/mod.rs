/// LLM Client: the single point of entry for all LLM calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Pipelines depend on the `TextGenerator` trait; `LlmClient` is the production backend.
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;
/// Only rate-limit responses are retried; every other failure surfaces immediately.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One piece of a user message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Document { media_type: String, data: Bytes },
}

/// A provider-neutral generation request: system instruction plus ordered parts.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub system: String,
    pub parts: Vec<ContentPart>,
}

impl LlmRequest {
    /// All text parts joined with newlines (documents are skipped).
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Document { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `generate(prompt, attachments) -> text`. Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AnthropicBlock {
    Text { text: String },
    Document { source: DocumentSource },
}

#[derive(Debug, Serialize)]
struct DocumentSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: String,
    data: String,
}

impl From<&ContentPart> for AnthropicBlock {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => AnthropicBlock::Text { text: text.clone() },
            ContentPart::Document { media_type, data } => AnthropicBlock::Document {
                source: DocumentSource {
                    source_type: "base64",
                    media_type: media_type.clone(),
                    data: BASE64.encode(data),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API. Built once at startup and shared.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, timeout: std::time::Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    /// Retries only on 429 (rate limit) with exponential backoff.
    pub async fn call(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: &request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.parts.iter().map(AnthropicBlock::from).collect(),
            }],
        };

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM API rate limited (attempt {}), retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() == 429 {
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(LlmError::RateLimited {
            retries: MAX_RATE_LIMIT_RETRIES,
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Returns a canned reply and records every request it receives.
    pub struct ScriptedGenerator {
        reply: Result<String, u16>,
        pub requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedGenerator {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: Ok(reply.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_document_part_serializes_as_base64_block() {
        let part = ContentPart::Document {
            media_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
        };
        let block = serde_json::to_value(AnthropicBlock::from(&part)).unwrap();
        assert_eq!(block["type"], "document");
        assert_eq!(block["source"]["type"], "base64");
        assert_eq!(block["source"]["media_type"], "application/pdf");
        assert_eq!(block["source"]["data"], "JVBERi0xLjQ=");
    }

    #[test]
    fn test_text_part_serializes_as_text_block() {
        let block =
            serde_json::to_value(AnthropicBlock::from(&ContentPart::Text("hi".to_string())))
                .unwrap();
        assert_eq!(block, serde_json::json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn test_request_text_skips_documents() {
        let request = LlmRequest {
            system: "sys".to_string(),
            parts: vec![
                ContentPart::Text("a".to_string()),
                ContentPart::Document {
                    media_type: "application/pdf".to_string(),
                    data: Bytes::new(),
                },
                ContentPart::Text("b".to_string()),
            ],
        };
        assert_eq!(request.text(), "a\nb");
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking"},{"type":"text","text":"{}"}],"usage":{"input_tokens":1,"output_tokens":2}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("{}"));
    }
}
