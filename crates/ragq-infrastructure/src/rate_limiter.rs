//! Login attempt rate limiter: locks out a key after too many consecutive
//! failures, in-memory, single-node.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use crate::constants::{
    LOGIN_CLEANUP_IDLE_MULTIPLIER, LOGIN_CLEANUP_INTERVAL_SECONDS, LOGIN_LOCKOUT_SECONDS,
    LOGIN_MAX_FAILED_ATTEMPTS,
};

struct Entry {
    failed_attempts: u32,
    locked_until: Option<i64>,
    last_seen: i64,
}

/// Tracks failed login attempts per key (typically username or client IP)
/// and locks a key out for `LOGIN_LOCKOUT_SECONDS` once
/// `LOGIN_MAX_FAILED_ATTEMPTS` is reached.
pub struct LoginRateLimiter {
    entries: DashMap<String, Entry>,
    last_cleanup: AtomicI64,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    /// Create an empty limiter.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            last_cleanup: AtomicI64::new(Utc::now().timestamp()),
        }
    }

    /// Whether `key` is currently locked out.
    pub fn is_locked(&self, key: &str) -> bool {
        self.maybe_cleanup();
        let now = Utc::now().timestamp();
        match self.entries.get(key) {
            Some(entry) => entry.locked_until.is_some_and(|until| until > now),
            None => false,
        }
    }

    /// Record a failed login attempt, locking the key out if this attempt
    /// pushes it past `LOGIN_MAX_FAILED_ATTEMPTS`.
    pub fn record_failure(&self, key: &str) {
        let now = Utc::now().timestamp();
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            failed_attempts: 0,
            locked_until: None,
            last_seen: now,
        });
        entry.failed_attempts += 1;
        entry.last_seen = now;
        if entry.failed_attempts >= LOGIN_MAX_FAILED_ATTEMPTS {
            entry.locked_until = Some(now + LOGIN_LOCKOUT_SECONDS);
        }
    }

    /// Clear a key's failure count on a successful login.
    pub fn record_success(&self, key: &str) {
        self.entries.remove(key);
    }

    fn maybe_cleanup(&self) {
        let now = Utc::now().timestamp();
        let last = self.last_cleanup.load(Ordering::Relaxed);
        if now - last < LOGIN_CLEANUP_INTERVAL_SECONDS {
            return;
        }
        if self
            .last_cleanup
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let idle_cutoff = now - LOGIN_LOCKOUT_SECONDS * LOGIN_CLEANUP_IDLE_MULTIPLIER;
        self.entries.retain(|_, entry| entry.last_seen > idle_cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_not_locked_below_the_failure_threshold() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..LOGIN_MAX_FAILED_ATTEMPTS - 1 {
            limiter.record_failure("alice");
        }
        assert!(!limiter.is_locked("alice"));
    }

    #[test]
    fn key_locks_out_at_the_failure_threshold() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..LOGIN_MAX_FAILED_ATTEMPTS {
            limiter.record_failure("alice");
        }
        assert!(limiter.is_locked("alice"));
    }

    #[test]
    fn success_clears_prior_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..LOGIN_MAX_FAILED_ATTEMPTS - 1 {
            limiter.record_failure("alice");
        }
        limiter.record_success("alice");
        limiter.record_failure("alice");
        assert!(!limiter.is_locked("alice"));
    }

    #[test]
    fn lockout_is_scoped_to_its_own_key() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..LOGIN_MAX_FAILED_ATTEMPTS {
            limiter.record_failure("alice");
        }
        assert!(!limiter.is_locked("bob"));
    }
}
