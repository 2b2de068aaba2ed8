//! Chunker Ports (C4)
//!
//! Both chunkers are pure, CPU-bound, and synchronous — per §5, "the
//! chunker and the tokenizer ... never suspend" — so these ports are plain
//! traits, not `async_trait`.

use crate::entities::Chunk;
use crate::error::Result;

/// Context-aware segmentation of a single document.
///
/// Implementations maintain a heading stack while walking the document and
/// emit one chunk per section, splitting oversized sections with a
/// recursive separator cascade.
pub trait DocumentChunker: Send + Sync {
    /// Chunk `text`, sourced from `file_path`, tagging every chunk with
    /// `doc_type` (e.g. `"markdown"`, `"plaintext"`).
    ///
    /// Deterministic: the same `text` always yields byte-identical output.
    fn chunk(&self, text: &str, file_path: &str, doc_type: &str) -> Result<Vec<Chunk>>;
}

/// Context-aware segmentation of a single source file.
///
/// Implementations detect function/class boundaries with a
/// language-specific regular expression, infer enclosing class and
/// docstring context, and split oversized units with the same recursive
/// splitter used by [`DocumentChunker`].
pub trait CodeChunker: Send + Sync {
    /// Chunk `code`, sourced from `file_path`, written in `language`.
    ///
    /// Deterministic: the same `code` always yields byte-identical output.
    fn chunk(&self, code: &str, file_path: &str, language: &str) -> Result<Vec<Chunk>>;
}
