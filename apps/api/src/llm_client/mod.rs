/// LLM client: the single point of entry for every text-generation call in HireSkill.
///
/// ARCHITECTURAL RULE: No other module may talk to the LLM endpoint directly.
/// Generators depend on the `CompletionProvider` trait; `LlmClient` is the
/// production implementation.
///
/// Two wire formats are supported:
/// - OpenAI-compatible chat completions (`messages`, bearer key)
/// - Ollama `/api/generate` (`prompt`, `stream: false`), used for keyless local endpoints
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected API response format")]
    UnexpectedFormat,

    #[error("Gave up after {retries} retries")]
    RetriesExhausted { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One completion request. `json_mode` asks Ollama for JSON output; chat
/// endpoints rely on the system prompt instead.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub json_mode: bool,
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    ChatCompletions,
    OllamaGenerate,
}

impl WireFormat {
    pub fn detect(api_url: &str, api_key: &str) -> Self {
        if api_url.to_lowercase().contains("openai") || !api_key.is_empty() {
            WireFormat::ChatCompletions
        } else {
            WireFormat::OllamaGenerate
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

/// The single LLM client used by all generators in HireSkill.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    wire_format: WireFormat,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.llm_api_url.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            wire_format: WireFormat::detect(&config.llm_api_url, &config.llm_api_key),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire_format
    }

    fn request_body(&self, request: &CompletionRequest<'_>) -> Result<Value, LlmError> {
        let body = match self.wire_format {
            WireFormat::ChatCompletions => serde_json::to_value(ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: request.system,
                    },
                    ChatMessage {
                        role: "user",
                        content: request.prompt,
                    },
                ],
                temperature: TEMPERATURE,
                max_tokens: request.max_tokens,
            })?,
            // Ollama has no system role on /api/generate, so the system text leads the prompt.
            WireFormat::OllamaGenerate => serde_json::to_value(OllamaRequest {
                model: &self.model,
                prompt: format!("{}\n\n{}", request.system, request.prompt),
                stream: false,
                format: request.json_mode.then_some("json"),
            })?,
        };
        Ok(body)
    }

    /// Makes a raw call to the LLM endpoint and returns the generated text.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn call(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let body = self.request_body(&request)?;
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut builder = self.client.post(&self.api_url).json(&body);
            if !self.api_key.is_empty() {
                builder = builder.bearer_auth(&self.api_key);
            }

            let response = match builder.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| error_message(&v))
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let payload: Value = response.json().await?;
            let text = extract_text(&payload).ok_or(LlmError::UnexpectedFormat)?;
            if text.trim().is_empty() {
                return Err(LlmError::EmptyContent);
            }

            debug!(
                "LLM call succeeded on attempt {}: {} chars",
                attempt + 1,
                text.len()
            );
            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        self.call(request).await
    }
}

/// Reads the generated text from either a chat-completions or an Ollama payload.
fn extract_text(payload: &Value) -> Option<String> {
    if let Some(content) = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    {
        return Some(content.to_string());
    }
    payload
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn error_message(payload: &Value) -> Option<String> {
    match payload.get("error")? {
        Value::String(s) => Some(s.clone()),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
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

/// Finds the first balanced `{ ... }` object embedded in free text that parses
/// as JSON and satisfies `accept`. Braces inside string literals are ignored.
pub fn find_json_object(text: &str, accept: impl Fn(&Value) -> bool) -> Option<Value> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let bytes = cleaned.as_bytes();

    for (start, _) in cleaned.match_indices('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &cleaned[start..=start + offset];
                        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                            if value.is_object() && accept(&value) {
                                return Some(value);
                            }
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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
    fn test_wire_format_detection() {
        assert_eq!(
            WireFormat::detect("https://api.openai.com/v1/chat/completions", ""),
            WireFormat::ChatCompletions
        );
        assert_eq!(
            WireFormat::detect("https://api.groq.com/openai/v1/chat/completions", ""),
            WireFormat::ChatCompletions
        );
        assert_eq!(
            WireFormat::detect("https://llm.internal/v1/chat", "sk-123"),
            WireFormat::ChatCompletions
        );
        assert_eq!(
            WireFormat::detect("http://localhost:11434/api/generate", ""),
            WireFormat::OllamaGenerate
        );
    }

    #[test]
    fn test_extract_text_from_both_payload_shapes() {
        let chat = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(extract_text(&chat).as_deref(), Some("hi"));

        let ollama = json!({"model": "llama2", "response": "hello", "done": true});
        assert_eq!(extract_text(&ollama).as_deref(), Some("hello"));

        assert!(extract_text(&json!({"foo": 1})).is_none());
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(&json!({"error": {"message": "bad key"}})).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            error_message(&json!({"error": "model not found"})).as_deref(),
            Some("model not found")
        );
    }

    #[test]
    fn test_find_json_object_skips_prose_and_nested_noise() {
        let text = "Sure! Here is {not json} your resume:\n```json\n{\"summary\": \"Uses {braces} in text\", \"skills\": {\"technical\": [\"Rust\"]}}\n```\nEnjoy.";
        let found = find_json_object(text, |v| v.get("summary").is_some()).unwrap();
        assert_eq!(found["skills"]["technical"][0], "Rust");
    }

    #[test]
    fn test_find_json_object_applies_predicate() {
        let text = "{\"a\": 1} then {\"personal_info\": {\"full_name\": \"Ada\"}}";
        let found = find_json_object(text, |v| v.get("personal_info").is_some()).unwrap();
        assert_eq!(found["personal_info"]["full_name"], "Ada");
        assert!(find_json_object("no objects here", |_| true).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_gives_up_when_endpoint_is_unreachable() {
        let mut config = Config::for_tests();
        config.llm_api_url = "http://127.0.0.1:9/api/generate".to_string();
        let client = LlmClient::new(&config).unwrap();

        let result = client
            .call(CompletionRequest {
                system: "system",
                prompt: "prompt",
                max_tokens: 16,
                json_mode: false,
            })
            .await;

        assert!(result.is_err());
    }
}
