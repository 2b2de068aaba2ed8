//! LLM Client Port (§6, §9 "dynamic typing of LLM payloads")

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// A single message in a chat-style LLM call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmMessage {
    /// `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl LlmMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// Token accounting for one LLM call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmUsage {
    /// Prompt tokens.
    pub input_tokens: u32,
    /// Completion tokens.
    pub output_tokens: u32,
}

impl LlmUsage {
    /// `input_tokens + output_tokens`.
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// The normalized shape every upstream LLM response is parsed into,
/// regardless of whether the wire format is content-as-string,
/// content-as-list-of-parts, or OpenAI-style `choices`.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    /// The completion text.
    pub content: String,
    /// Token accounting reported by the upstream.
    pub usage: LlmUsage,
}

/// Per-call tuning knobs, independent of the message list.
#[derive(Debug, Clone)]
pub struct LlmCallOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum completion tokens.
    pub max_tokens: u32,
    /// Attempt number within the caller's retry loop, `0` on the first
    /// try; implementations rotate their browser-fingerprint hint as this
    /// increases.
    pub attempt: u32,
}

impl Default for LlmCallOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 1024,
            attempt: 0,
        }
    }
}

/// A normalized LLM client: unary and streaming completion over an
/// OpenAI-compatible wire format.
///
/// Retry, backoff, and WAF-response detection are the caller's
/// responsibility (`ragq-application::use_cases::qa_chain`); this port
/// only makes one attempt per call and surfaces whatever error it hits so
/// the caller can classify it as retryable or not.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Make one non-streaming completion call.
    async fn complete(
        &self,
        messages: &[LlmMessage],
        options: &LlmCallOptions,
    ) -> Result<LlmResponse>;

    /// Make one streaming completion call. The stream yields text deltas;
    /// the final `LlmUsage` is only known once the stream is exhausted, so
    /// callers that need it should accumulate deltas and call `complete`'s
    /// sibling accounting separately, or rely on the last streamed item
    /// carrying usage out-of-band via the adapter's own bookkeeping.
    async fn stream(
        &self,
        messages: &[LlmMessage],
        options: &LlmCallOptions,
    ) -> Result<BoxStream<'static, Result<String>>>;
}
