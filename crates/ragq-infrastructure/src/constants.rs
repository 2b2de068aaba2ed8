//! Infrastructure-layer constants: configuration defaults, rate-limiter
//! thresholds, and pool sizing not already covered by
//! `ragq_domain::constants`.

/// Environment variable prefix for configuration overrides, e.g.
/// `RAGQ_SERVER_PORT`.
pub const CONFIG_ENV_PREFIX: &str = "RAGQ";

/// Default configuration file name, looked up relative to the current
/// directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "ragq.toml";

/// Minimum JWT secret length enforced at config validation time.
pub const JWT_MIN_SECRET_LENGTH: usize = 32;

// ============================================================================
// LOGIN / AUTH RATE LIMITING (4.11)
// ============================================================================

/// Failed authentication attempts allowed before lockout.
pub const LOGIN_MAX_FAILED_ATTEMPTS: u32 = 5;

/// Lockout duration once `LOGIN_MAX_FAILED_ATTEMPTS` is reached, in seconds.
pub const LOGIN_LOCKOUT_SECONDS: i64 = 300;

/// Periodic cleanup interval for expired rate-limiter entries, in seconds.
pub const LOGIN_CLEANUP_INTERVAL_SECONDS: i64 = 3600;

/// An entry idle for longer than twice the lockout window is eligible for
/// cleanup, even if it never triggered a lockout.
pub const LOGIN_CLEANUP_IDLE_MULTIPLIER: i64 = 2;

// ============================================================================
// DATABASE POOL (§5)
// ============================================================================

/// Minimum pooled connections kept warm.
pub const DB_POOL_MIN_CONNECTIONS: u32 = 5;

/// Maximum pooled connections, including overflow.
pub const DB_POOL_MAX_CONNECTIONS: u32 = 15;

/// Seconds to wait for a connection before giving up.
pub const DB_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Maximum lifetime of a pooled connection before forced recycling, in
/// seconds.
pub const DB_POOL_MAX_LIFETIME_SECS: u64 = 3600;

// ============================================================================
// API KEY CACHE
// ============================================================================

/// Time-to-live for a cached API-key lookup, in seconds.
pub const API_KEY_CACHE_TTL_SECS: u64 = 60;

/// Maximum number of distinct API keys cached at once.
pub const API_KEY_CACHE_MAX_ENTRIES: u64 = 10_000;

// ============================================================================
// TASK QUEUE / SCHEDULER (C8)
// ============================================================================

/// Bounded task-queue channel capacity.
pub const TASK_QUEUE_CAPACITY: usize = 256;

/// Fixed number of worker tasks draining the task queue.
pub const TASK_QUEUE_WORKER_COUNT: usize = 3;

/// Scheduler polling interval, in seconds.
pub const SCHEDULER_POLL_INTERVAL_SECS: u64 = 60;

/// Misfires within this grace window are coalesced into a single run.
pub const SCHEDULER_MISFIRE_GRACE_SECS: i64 = 300;
