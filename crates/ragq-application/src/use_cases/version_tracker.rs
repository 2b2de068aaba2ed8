//! Append-only version history for knowledge entries (4.12).

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use ragq_domain::entities::{ChangeKind, VersionRecord};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::infrastructure::LockProvider;
use ragq_domain::ports::repositories::VersionRepository;

/// Per-entry lock key prefix, used with [`LockProvider`] to serialize
/// version-number assignment for a given entry.
fn lock_key(entry_id: &str) -> String {
    format!("version-tracker:{entry_id}")
}

/// Assigns strictly monotonic version numbers and records append-only
/// snapshots, per the specification's 4.12 section.
pub struct VersionTracker {
    repository: Arc<dyn VersionRepository>,
    lock_provider: Arc<dyn LockProvider>,
}

impl VersionTracker {
    /// Build a tracker over the given repository and lock provider.
    pub fn new(repository: Arc<dyn VersionRepository>, lock_provider: Arc<dyn LockProvider>) -> Self {
        Self {
            repository,
            lock_provider,
        }
    }

    /// Record a new version for `entry_id`, assigning `max_version + 1`
    /// under a per-entry lock so concurrent writers never collide.
    pub async fn create_version(
        &self,
        entry_id: &str,
        content: &str,
        metadata: Value,
        change_kind: ChangeKind,
        actor: &str,
        reason: Option<&str>,
    ) -> Result<VersionRecord> {
        let guard = self.lock_provider.acquire_lock(&lock_key(entry_id)).await?;

        let next_version = self.repository.max_version(entry_id).await? + 1;
        let record = VersionRecord {
            entry_id: entry_id.to_string(),
            version: next_version,
            content: content.to_string(),
            metadata,
            change_kind,
            actor: actor.to_string(),
            reason: reason.map(str::to_string),
            created_at: Utc::now(),
        };

        let result = self.repository.insert(&record).await;
        let _ = self.lock_provider.release_lock(guard).await;
        result?;
        Ok(record)
    }

    /// Roll back `entry_id` to `target_version` by inserting a *new*
    /// version whose content and metadata equal the target's. The caller
    /// is responsible for re-embedding content into the vector store if
    /// it changed — this tracker only manages version history.
    pub async fn rollback_to(
        &self,
        entry_id: &str,
        target_version: u32,
        actor: &str,
        reason: Option<&str>,
    ) -> Result<VersionRecord> {
        let target = self
            .repository
            .get(entry_id, target_version)
            .await?
            .ok_or_else(|| Error::not_found(format!("version {target_version} of {entry_id}")))?;

        let rollback_reason = reason
            .map(str::to_string)
            .unwrap_or_else(|| format!("rollback to v{target_version}"));

        self.create_version(
            entry_id,
            &target.content,
            target.metadata,
            ChangeKind::Update,
            actor,
            Some(&rollback_reason),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragq_domain::ports::infrastructure::LockGuard;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryVersionRepository {
        versions: Mutex<Vec<VersionRecord>>,
    }

    #[async_trait]
    impl VersionRepository for InMemoryVersionRepository {
        async fn insert(&self, record: &VersionRecord) -> Result<()> {
            self.versions.lock().unwrap().push(record.clone());
            Ok(())
        }
        async fn max_version(&self, entry_id: &str) -> Result<u32> {
            Ok(self
                .versions
                .lock()
                .unwrap()
                .iter()
                .filter(|v| v.entry_id == entry_id)
                .map(|v| v.version)
                .max()
                .unwrap_or(0))
        }
        async fn get(&self, entry_id: &str, version: u32) -> Result<Option<VersionRecord>> {
            Ok(self
                .versions
                .lock()
                .unwrap()
                .iter()
                .find(|v| v.entry_id == entry_id && v.version == version)
                .cloned())
        }
        async fn list(&self, entry_id: &str) -> Result<Vec<VersionRecord>> {
            Ok(self
                .versions
                .lock()
                .unwrap()
                .iter()
                .filter(|v| v.entry_id == entry_id)
                .cloned()
                .collect())
        }
    }

    struct NoopLockProvider;
    #[async_trait]
    impl LockProvider for NoopLockProvider {
        async fn acquire_lock(&self, key: &str) -> Result<LockGuard> {
            Ok(LockGuard {
                key: key.to_string(),
                token: "t".to_string(),
            })
        }
        async fn release_lock(&self, _guard: LockGuard) -> Result<()> {
            Ok(())
        }
    }

    fn tracker() -> VersionTracker {
        VersionTracker::new(Arc::new(InMemoryVersionRepository::default()), Arc::new(NoopLockProvider))
    }

    #[tokio::test]
    async fn versions_start_at_one_and_increase_monotonically() {
        let tracker = tracker();
        let v1 = tracker
            .create_version("e1", "content v1", Value::Null, ChangeKind::Create, "u1", None)
            .await
            .unwrap();
        let v2 = tracker
            .create_version("e1", "content v2", Value::Null, ChangeKind::Update, "u1", None)
            .await
            .unwrap();
        assert_eq!(v1.version, 1);
        assert_eq!(v2.version, 2);
    }

    #[tokio::test]
    async fn rollback_creates_a_new_version_matching_the_target_content() {
        let tracker = tracker();
        tracker
            .create_version("e1", "content v1", Value::Null, ChangeKind::Create, "u1", None)
            .await
            .unwrap();
        tracker
            .create_version("e1", "content v2", Value::Null, ChangeKind::Update, "u1", None)
            .await
            .unwrap();

        let v3 = tracker.rollback_to("e1", 1, "u1", None).await.unwrap();
        assert_eq!(v3.version, 3);
        assert_eq!(v3.content, "content v1");
        assert_eq!(v3.reason.as_deref(), Some("rollback to v1"));
    }

    #[tokio::test]
    async fn rollback_to_missing_version_is_not_found() {
        let tracker = tracker();
        tracker
            .create_version("e1", "content v1", Value::Null, ChangeKind::Create, "u1", None)
            .await
            .unwrap();
        let err = tracker.rollback_to("e1", 99, "u1", None).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
