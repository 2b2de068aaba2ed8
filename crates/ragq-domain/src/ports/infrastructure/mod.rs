//! Infrastructure Service Ports
//!
//! Cross-cutting contracts not specific to any single external provider:
//! authentication verification, distributed locking, and durable
//! key-value state.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`TokenVerifier`] | JWT verification (HS256) |
//! | [`PasswordHasher`] | Password verification |
//! | [`LockProvider`] | Per-key mutual exclusion |
//! | [`StateStoreProvider`] | Durable key-value persistence |

/// Authentication verification ports.
pub mod auth;
/// Distributed lock port.
pub mod lock;
/// Durable state store port.
pub mod state_store;

pub use auth::{PasswordHasher, TokenClaims, TokenVerifier};
pub use lock::{LockGuard, LockProvider};
pub use state_store::StateStoreProvider;
