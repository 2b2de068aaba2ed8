//! Use cases: the orchestration logic that calls domain ports to
//! implement each pipeline component, independent of any concrete
//! adapter.
//!
//! | Use case | Component |
//! |----------|-----------|
//! | [`ingestion::IngestionCoordinator`] | C5 |
//! | [`retrieval::HybridRetriever`] | C6 |
//! | [`qa_chain::QaChain`] | C7 |
//! | [`knowledge_task::KnowledgeTaskProcessor`] | C8 |
//! | [`version_tracker::VersionTracker`] | 4.12 |

/// Ingestion coordinator (C5).
pub mod ingestion;
/// Knowledge-add task processing (C8).
pub mod knowledge_task;
/// QA orchestration chain (C7).
pub mod qa_chain;
/// Hybrid retriever (C6).
pub mod retrieval;
/// Version tracker (4.12).
pub mod version_tracker;

pub use ingestion::{IngestionCoordinator, IngestionReport};
pub use knowledge_task::KnowledgeTaskProcessor;
pub use qa_chain::{QaChain, QueryInput, QueryOutput, StreamEvent};
pub use retrieval::{HybridRetriever, RetrievalQuery};
pub use version_tracker::VersionTracker;
