//! Append-only audit log of LLM invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of request a [`UsageLog`] row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// A `/query` or `/query/stream` call.
    Query,
    /// A conversation-history summarization call.
    Summarization,
    /// A task-queue content-extraction call.
    Extraction,
}

/// One row of the append-only usage audit trail.
///
/// Written after every LLM invocation — including failures — by
/// `ragq-application::use_cases::qa_chain`, per `admin/usage_logger.py` in
/// the original system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageLog {
    /// LLM provider identifier, e.g. `"openai"`.
    pub provider: String,
    /// Model identifier, e.g. `"gpt-4o-mini"`.
    pub model: String,
    /// User id the request is attributed to.
    pub user_id: String,
    /// What kind of call this was.
    pub request_kind: RequestKind,
    /// The question or prompt text (may be truncated by the caller before
    /// persisting, per retention policy).
    pub question: String,
    /// A preview of the answer, truncated to a bounded length.
    pub answer_preview: String,
    /// Prompt token count.
    pub input_tokens: u32,
    /// Completion token count.
    pub output_tokens: u32,
    /// Estimated cost in USD, if the provider's pricing is known.
    pub cost_estimate: Option<f64>,
    /// Wall-clock duration of the call.
    pub duration_ms: u64,
    /// Number of chunks retrieved for this request, 0 for non-retrieval
    /// calls.
    pub retrieved_count: u32,
    /// Whether the reranker was used.
    pub reranked: bool,
    /// Whether the call succeeded.
    pub success: bool,
    /// Truncated error message, set only when `success == false`.
    pub error: Option<String>,
    /// Caller IP address.
    pub client_ip: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// When the request was recorded.
    pub timestamp: DateTime<Utc>,
}
