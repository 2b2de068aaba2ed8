//! Knowledge Entry / Group Repository

use crate::entities::{KnowledgeEntry, KnowledgeGroup};
use crate::error::Result;
use async_trait::async_trait;

/// Relational persistence for [`KnowledgeEntry`] and [`KnowledgeGroup`],
/// including their many-to-many join table.
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    /// Insert a new knowledge entry.
    async fn create_entry(&self, entry: &KnowledgeEntry) -> Result<()>;

    /// Fetch an entry by id, if it exists and the caller may see it per
    /// the tenant filter applied by the caller.
    async fn get_entry(&self, id: &str) -> Result<Option<KnowledgeEntry>>;

    /// Overwrite an entry's mutable fields. Only task-queue workers call
    /// this — entries are otherwise immutable outside versioning.
    async fn update_entry(&self, entry: &KnowledgeEntry) -> Result<()>;

    /// Delete an entry. Callers are responsible for also deleting the
    /// corresponding vector-store point.
    async fn delete_entry(&self, id: &str) -> Result<()>;

    /// Resolve group names to ids, creating any that do not yet exist for
    /// `owner_id`.
    async fn ensure_groups(
        &self,
        owner_id: &str,
        names: &[String],
    ) -> Result<Vec<KnowledgeGroup>>;

    /// Attach an entry to a set of groups (replacing any prior
    /// membership).
    async fn set_entry_groups(&self, entry_id: &str, group_ids: &[String]) -> Result<()>;

    /// List the group ids an entry belongs to.
    async fn entry_group_ids(&self, entry_id: &str) -> Result<Vec<String>>;
}
