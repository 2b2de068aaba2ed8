//! Version Record Repository (4.12)

use crate::entities::VersionRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Append-only persistence for [`VersionRecord`].
///
/// Implementations must guarantee version-number monotonicity per
/// `entry_id` under concurrent writers, either via a per-entry lock (see
/// [`crate::ports::infrastructure::LockProvider`]) or a uniqueness
/// constraint on `(entry_id, version)` with retry on conflict.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Insert a new version row. Callers must have already computed
    /// `version` as `max_version(entry_id) + 1`.
    async fn insert(&self, record: &VersionRecord) -> Result<()>;

    /// The highest version number recorded for `entry_id`, `0` if none
    /// exist yet.
    async fn max_version(&self, entry_id: &str) -> Result<u32>;

    /// Fetch a specific version.
    async fn get(&self, entry_id: &str, version: u32) -> Result<Option<VersionRecord>>;

    /// List every version for an entry, oldest first.
    async fn list(&self, entry_id: &str) -> Result<Vec<VersionRecord>>;
}
