//! Infrastructure layer: concrete wiring of the domain ports to Postgres,
//! JWT, and in-process adapters, plus the cross-cutting concerns
//! (configuration, logging, rate limiting, caching) that sit outside the
//! hexagon.
//!
//! [`context::AppContext`] is the composition root: built once at
//! startup, it owns every adapter and use case and is handed to the HTTP
//! server, task queue, and scheduler by `Arc`.

/// JWT verification.
pub mod auth;
/// Caching decorators over repository ports.
pub mod cache;
/// Configuration loading and value types.
pub mod config;
/// Tunable constants shared across this crate.
pub mod constants;
/// The composition root: [`context::AppContext`].
pub mod context;
/// Postgres-backed repository and state-store adapters.
pub mod db;
/// In-process distributed lock provider.
pub mod lock;
/// Structured logging setup.
pub mod logging;
/// Login failure tracking and lockout.
pub mod rate_limiter;
/// Background incremental-reindex scheduler (C8).
pub mod scheduler;
/// Knowledge-add task queue (C8).
pub mod task_queue;

pub use context::AppContext;
