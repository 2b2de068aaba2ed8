//! Application layer for the RAG question-answering service.
//!
//! This crate depends on `ragq-domain` alone: every use case here is
//! expressed purely in terms of domain ports, so it can be tested with
//! in-memory fakes and wired to real adapters only at the
//! `ragq-infrastructure` boundary.
//!
//! - [`use_cases`] — one module per pipeline component (C5–C7, 4.12),
//!   each a plain struct holding `Arc<dyn Port>` fields.
//! - [`support`] — pure, synchronous helper logic (fusion, context
//!   budgeting, citation highlighting, conversation bookkeeping) factored
//!   out for independent unit testing.

/// Pure helper logic used by the use cases.
pub mod support;
/// Use case orchestration.
pub mod use_cases;

pub use use_cases::{
    HybridRetriever, IngestionCoordinator, IngestionReport, KnowledgeTaskProcessor, QaChain,
    QueryInput, QueryOutput, RetrievalQuery, StreamEvent, VersionTracker,
};
