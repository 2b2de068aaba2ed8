//! Normalized LLM client over an OpenAI-compatible chat-completions API.
//!
//! The original client this was ported from impersonated a rotating set of
//! browser TLS fingerprints to get past upstream WAFs; no crate in this
//! workspace does TLS fingerprint impersonation, so each retry attempt
//! instead rotates a plain `User-Agent` header. Response parsing keeps the
//! dual-format normalization: OpenAI's `choices[0].message.content` /
//! `usage.prompt_tokens` shape, and Anthropic's `content` list-of-parts /
//! `usage.input_tokens` shape, both collapse into the same `LlmResponse`.

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::providers::llm::{LlmCallOptions, LlmClient, LlmMessage, LlmResponse, LlmUsage};

use crate::constants::{CONTENT_TYPE_JSON, HTTP_REQUEST_TIMEOUT_SECS};
use crate::utils::check_and_parse;

const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edg/101.0.1210.47",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.5 Safari/605.1.15",
];

fn user_agent_for_attempt(attempt: u32) -> &'static str {
    USER_AGENTS[attempt as usize % USER_AGENTS.len()]
}

/// Normalized LLM client over an OpenAI-compatible `/chat/completions` API.
pub struct OpenAiCompatibleClient {
    base_url: String,
    api_key: String,
    model: String,
    http: Client,
}

impl OpenAiCompatibleClient {
    /// Build a client against `base_url` (e.g. `https://api.openai.com/v1`)
    /// using `model` and `api_key`.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS * 4))
            .build()
            .expect("reqwest client builder should not fail with static config");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            http,
        }
    }

    fn request_body(&self, messages: &[LlmMessage], options: &LlmCallOptions, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
            "stream": stream,
        })
    }
}

/// Normalize an upstream completion response, tolerating both OpenAI's
/// `choices` shape and Anthropic's `content` list-of-parts shape.
fn normalize_response(body: &Value) -> Result<LlmResponse> {
    if let Some(choices) = body["choices"].as_array() {
        let content = choices
            .first()
            .and_then(|c| c["message"]["content"].as_str())
            .unwrap_or_default()
            .to_string();

        let usage = LlmUsage {
            input_tokens: body["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: body["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        return Ok(LlmResponse { content, usage });
    }

    if let Some(parts) = body["content"].as_array() {
        let content = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        let usage = LlmUsage {
            input_tokens: body["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: body["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        };

        return Ok(LlmResponse { content, usage });
    }

    Err(Error::upstream("LLM response matched neither the OpenAI nor Anthropic response shape"))
}

/// Extract a text delta from one SSE `data:` payload, if the event carries
/// one, in either OpenAI (`choices[0].delta.content`) or Anthropic
/// (`delta.text`) streaming shape.
fn extract_delta(event: &Value) -> Option<String> {
    if let Some(content) = event["choices"][0]["delta"]["content"].as_str() {
        return Some(content.to_string());
    }
    if let Some(text) = event["delta"]["text"].as_str() {
        return Some(text.to_string());
    }
    None
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[LlmMessage], options: &LlmCallOptions) -> Result<LlmResponse> {
        let body = self.request_body(messages, options, false);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .header("User-Agent", user_agent_for_attempt(options.attempt))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("LLM completion request failed", e))?;

        let parsed = check_and_parse(response, "llm").await?;
        normalize_response(&parsed)
    }

    async fn stream(&self, messages: &[LlmMessage], options: &LlmCallOptions) -> Result<BoxStream<'static, Result<String>>> {
        let body = self.request_body(messages, options, true);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .header("User-Agent", user_agent_for_attempt(options.attempt))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("LLM stream request failed", e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("LLM stream request failed ({status}): {text}")));
        }

        let mut byte_stream = response.bytes_stream();

        let stream = try_stream! {
            let mut buffer = String::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(|e| Error::network_with_source("LLM stream read failed", e))?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline_pos) = buffer.find('\n') {
                    let line = buffer[..newline_pos].trim_end_matches('\r').to_string();
                    buffer.drain(..=newline_pos);

                    let Some(payload) = line.strip_prefix("data: ") else { continue };
                    if payload == "[DONE]" {
                        continue;
                    }

                    let event: Value = serde_json::from_str(payload)
                        .map_err(|e| Error::upstream(format!("malformed SSE event: {e}")))?;

                    if let Some(delta) = extract_delta(&event) {
                        yield delta;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_openai_shape() {
        let body = json!({
            "choices": [{"message": {"content": "hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5},
        });
        let response = normalize_response(&body).unwrap();
        assert_eq!(response.content, "hello");
        assert_eq!(response.usage.input_tokens, 10);
        assert_eq!(response.usage.output_tokens, 5);
    }

    #[test]
    fn normalizes_anthropic_shape() {
        let body = json!({
            "content": [{"type": "text", "text": "hel"}, {"type": "text", "text": "lo"}],
            "usage": {"input_tokens": 8, "output_tokens": 2},
        });
        let response = normalize_response(&body).unwrap();
        assert_eq!(response.content, "hello");
        assert_eq!(response.usage.input_tokens, 8);
    }

    #[test]
    fn unrecognized_shape_errors() {
        let body = json!({"unexpected": true});
        assert!(normalize_response(&body).is_err());
    }

    #[test]
    fn user_agent_rotates_by_attempt() {
        let a = user_agent_for_attempt(0);
        let b = user_agent_for_attempt(1);
        assert_ne!(a, b);
        assert_eq!(user_agent_for_attempt(0), user_agent_for_attempt(USER_AGENTS.len() as u32));
    }

    #[test]
    fn extracts_openai_delta() {
        let event = json!({"choices": [{"delta": {"content": "hi"}}]});
        assert_eq!(extract_delta(&event), Some("hi".to_string()));
    }

    #[test]
    fn extracts_anthropic_delta() {
        let event = json!({"delta": {"text": "hi"}});
        assert_eq!(extract_delta(&event), Some("hi".to_string()));
    }
}
