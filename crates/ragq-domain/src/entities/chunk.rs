//! The chunk entity — the atomic unit of retrieval.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Whether a chunk was extracted from source code or from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// A function, method, or class body extracted from source code.
    Code,
    /// A section extracted from a Markdown or plain-text document.
    Document,
}

/// A single indexed passage.
///
/// ## Business rules
///
/// - `id` is a deterministic hash of `file_path` and `ordinal`; re-chunking
///   the same file produces the same ids, which is what makes incremental
///   reindexing idempotent.
/// - `enhanced_content` (breadcrumb- or context-prefixed) is what gets
///   embedded and indexed; `content` is what gets displayed to a caller.
/// - The vector store and the keyword index must agree on the set of chunk
///   ids for a given file, modulo a bounded catch-up window during
///   ingestion (see `ragq_application::use_cases::ingestion`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic identifier: `sha256(file_path || "#" || ordinal)`.
    pub id: String,
    /// The raw, unmodified passage text.
    pub content: String,
    /// The text that is actually embedded and indexed — `content` prefixed
    /// with a breadcrumb (documents) or class/docstring context (code).
    pub enhanced_content: String,
    /// Path to the source file this chunk was extracted from.
    pub file_path: String,
    /// Dense, zero-based ordinal of this chunk within its file.
    pub ordinal: u32,
    /// Code or document.
    pub kind: ChunkKind,
    /// Programming language, set only when `kind == Code`.
    pub language: Option<String>,
    /// Full heading hierarchy, set only when `kind == Document`, e.g.
    /// `["# Intro", "## Setup"]`.
    pub heading_hierarchy: Vec<String>,
    /// The innermost heading for this chunk's section, set only when
    /// `kind == Document`.
    pub heading: Option<String>,
    /// Enclosing class or function symbol, set only when `kind == Code`.
    pub symbol: Option<String>,
    /// File-level docstring, set only when `kind == Code` and one exists.
    pub file_docstring: Option<String>,
    /// Name of the nearest enclosing class, set only when `kind == Code`
    /// and this chunk's symbol sits inside one.
    pub class_context: Option<String>,
    /// Owning user id. `None` means the chunk has no tenant restriction
    /// beyond `is_public`.
    pub owner_id: Option<String>,
    /// Whether this chunk is visible to every tenant.
    pub is_public: bool,
}

impl Chunk {
    /// Compute the deterministic id for a chunk at `ordinal` within
    /// `file_path`.
    pub fn derive_id(file_path: &str, ordinal: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(file_path.as_bytes());
        hasher.update(b"#");
        hasher.update(ordinal.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_id_is_deterministic() {
        let a = Chunk::derive_id("src/main.rs", 2);
        let b = Chunk::derive_id("src/main.rs", 2);
        assert_eq!(a, b);
    }

    #[test]
    fn derive_id_distinguishes_ordinals() {
        let a = Chunk::derive_id("src/main.rs", 0);
        let b = Chunk::derive_id("src/main.rs", 1);
        assert_ne!(a, b);
    }
}
