//! Pure, synchronous helper logic factored out of the use cases for
//! independent testability — none of this module touches a port.

/// Context-budget assembly for the QA chain's prompt (C7).
pub mod context_budget;
/// Citation highlighting (C7).
pub mod citation_highlighter;
/// Conversation history and summarization bookkeeping (C7).
pub mod conversation;
/// Hybrid vector/keyword score fusion (C6).
pub mod fusion;

pub use context_budget::{assemble, AssembledContext};
pub use citation_highlighter::highlight;
pub use conversation::{ConversationHistory, ConversationTurn};
pub use fusion::{fuse, fuse_default};
