//! HTTP surface for the RAG question-answering service.
//!
//! The teacher exposes its domain through the Model Context Protocol over
//! stdio/HTTP hybrid transports, wired through a handle-based DI layer
//! (see `init.rs` and `builder.rs` in the teacher tree). This service
//! exposes a plain JSON-over-HTTP API instead — `/query`, `/search`,
//! `/knowledge` — built on Rocket, with every dependency wired once by
//! [`ragq_infrastructure::AppContext`] rather than through a runtime
//! provider-swapping mechanism.

/// JWT and API-key authentication request guards.
pub mod auth;
/// Server-specific tunables.
pub mod constants;
/// Maps domain errors to HTTP responses.
pub mod error_response;
/// Route handlers, one module per resource.
pub mod handlers;
/// Rocket instance assembly and the process entry point.
pub mod init;
/// Per-session conversation history.
pub mod session;

pub use init::{build, run};
