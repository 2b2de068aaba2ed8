//! In-process distributed lock provider.
//!
//! A single-node stand-in: real multi-node deployments would back this
//! with Postgres advisory locks or Redis. Per-key mutual exclusion here
//! is enough to satisfy `VersionRepository`'s monotonicity requirement
//! within one process.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::infrastructure::{LockGuard, LockProvider};

/// `DashMap`-backed [`LockProvider`]: one `tokio::sync::Mutex` per key,
/// created lazily and kept for the process lifetime. Held guards are kept
/// in `held`, keyed by the opaque token returned to the caller, and
/// dropped (unlocking) on release.
#[derive(Default)]
pub struct InMemoryLockProvider {
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
    held: DashMap<String, OwnedMutexGuard<()>>,
}

impl InMemoryLockProvider {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[async_trait]
impl LockProvider for InMemoryLockProvider {
    async fn acquire_lock(&self, key: &str) -> Result<LockGuard> {
        let mutex = self.mutex_for(key);
        let guard = mutex.lock_owned().await;
        let token = Uuid::new_v4().to_string();
        self.held.insert(token.clone(), guard);

        Ok(LockGuard {
            key: key.to_string(),
            token,
        })
    }

    async fn release_lock(&self, guard: LockGuard) -> Result<()> {
        self.held
            .remove(&guard.token)
            .ok_or_else(|| Error::internal(format!("no lock held for token: {}", guard.token)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_waits_until_first_is_released() {
        let provider = Arc::new(InMemoryLockProvider::new());
        let guard = provider.acquire_lock("entry-1").await.unwrap();

        let provider2 = provider.clone();
        let acquired = Arc::new(tokio::sync::Notify::new());
        let acquired2 = acquired.clone();
        let handle = tokio::spawn(async move {
            let g = provider2.acquire_lock("entry-1").await.unwrap();
            acquired2.notify_one();
            provider2.release_lock(g).await.unwrap();
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(tokio::time::timeout(std::time::Duration::from_millis(10), acquired.notified())
            .await
            .is_err());

        provider.release_lock(guard).await.unwrap();
        handle.await.unwrap();
    }
}
