//! Moka-backed caching decorator for [`ApiKeyRepository::find_key`],
//! matching the teacher's cache-in-front-of-repository shape but keyed on
//! the key string rather than a query hash.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use ragq_domain::entities::{ApiKey, User};
use ragq_domain::error::Result;
use ragq_domain::ports::repositories::ApiKeyRepository;

use crate::constants::{API_KEY_CACHE_MAX_ENTRIES, API_KEY_CACHE_TTL_SECS};

/// Wraps an [`ApiKeyRepository`], caching `find_key` lookups for
/// `API_KEY_CACHE_TTL_SECS`. A miss caches `None` too, so a bad key
/// presented repeatedly does not hammer the database.
pub struct CachingApiKeyRepository<R> {
    inner: R,
    cache: Cache<String, Option<ApiKey>>,
}

impl<R: ApiKeyRepository> CachingApiKeyRepository<R> {
    /// Wrap `inner` with a TTL cache sized from the infrastructure
    /// constants.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(API_KEY_CACHE_MAX_ENTRIES)
                .time_to_live(Duration::from_secs(API_KEY_CACHE_TTL_SECS))
                .build(),
        }
    }
}

#[async_trait]
impl<R: ApiKeyRepository + Send + Sync> ApiKeyRepository for CachingApiKeyRepository<R> {
    async fn find_key(&self, key: &str) -> Result<Option<ApiKey>> {
        if let Some(cached) = self.cache.get(key).await {
            return Ok(cached);
        }
        let result = self.inner.find_key(key).await?;
        self.cache.insert(key.to_string(), result.clone()).await;
        Ok(result)
    }

    async fn record_key_usage(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        self.inner.record_key_usage(key).await
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        self.inner.find_user(user_id).await
    }

    async fn find_first_administrator(&self) -> Result<Option<User>> {
        self.inner.find_first_administrator().await
    }
}

impl<R> CachingApiKeyRepository<R> {
    /// Wrap an `Arc<R>`-backed repository; cheap to clone for sharing
    /// across handlers.
    pub fn shared(inner: R) -> Arc<Self>
    where
        R: ApiKeyRepository,
    {
        Arc::new(Self::new(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRepo {
        calls: AtomicUsize,
        key: ApiKey,
    }

    #[async_trait]
    impl ApiKeyRepository for CountingRepo {
        async fn find_key(&self, key: &str) -> Result<Option<ApiKey>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if key == self.key.key {
                Ok(Some(self.key.clone()))
            } else {
                Ok(None)
            }
        }

        async fn record_key_usage(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn find_user(&self, _user_id: &str) -> Result<Option<User>> {
            Ok(None)
        }

        async fn find_first_administrator(&self) -> Result<Option<User>> {
            Ok(None)
        }
    }

    fn sample_key() -> ApiKey {
        ApiKey {
            key: "k-1".to_string(),
            owner_user_id: Some("u1".to_string()),
            active: true,
            expires_at: None,
            usage_count: 0,
        }
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_repository_once() {
        let repo = CountingRepo {
            calls: AtomicUsize::new(0),
            key: sample_key(),
        };
        let cached = CachingApiKeyRepository::new(repo);

        cached.find_key("k-1").await.unwrap();
        cached.find_key("k-1").await.unwrap();
        let result = cached.find_key("k-1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recording_usage_invalidates_the_cached_entry() {
        let repo = CountingRepo {
            calls: AtomicUsize::new(0),
            key: sample_key(),
        };
        let cached = CachingApiKeyRepository::new(repo);

        cached.find_key("k-1").await.unwrap();
        cached.record_key_usage("k-1").await.unwrap();
        cached.find_key("k-1").await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
