//! Query-rewrite strategy selection (C6 step 1).

use serde::{Deserialize, Serialize};

/// The two query-rewrite strategies are mutually exclusive per request —
/// never combined — selected by request or config default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStrategy {
    /// No rewriting; retrieve with the original query only.
    #[default]
    None,
    /// Ask the LLM for N variants of the question; retrieve with each and
    /// union the result sets before fusion.
    MultiQuery,
    /// Ask the LLM for a hypothetical answer, embed it, and use it as the
    /// retrieval query alongside the original (Hypothetical Document
    /// Embeddings).
    Hyde,
}
