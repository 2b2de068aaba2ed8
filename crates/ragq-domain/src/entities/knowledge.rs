//! Knowledge entries and knowledge groups — first-class, user-authored
//! artifacts distinct from ingested source chunks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A first-class, user-authored knowledge artifact.
///
/// Each entry corresponds to exactly one vector-store point; deleting the
/// entry must delete that point too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeEntry {
    /// Stable identifier, also used as the vector-store point id.
    pub id: String,
    /// Short human-facing title.
    pub title: String,
    /// Free-text category label, e.g. "architecture", "runbook".
    pub category: Option<String>,
    /// One- or two-sentence summary used in previews and search results.
    pub summary: String,
    /// Free-text keyword list, LLM-extracted or user-supplied.
    pub keywords: Vec<String>,
    /// Technology-stack tags, LLM-extracted or user-supplied.
    pub tech_stack: Vec<String>,
    /// Truncated preview of `content`, safe to return in list views.
    pub content_preview: String,
    /// User id of the entry's owner.
    pub owner_id: String,
    /// Whether every tenant can read this entry.
    pub is_public: bool,
    /// Timestamp of the most recent version.
    pub updated_at: DateTime<Utc>,
}

/// A named collection of knowledge entries.
///
/// Many-to-many with [`KnowledgeEntry`]: an entry may belong to zero or
/// more groups, tracked through a join table owned by
/// `ragq-domain::ports::repositories::KnowledgeRepository`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeGroup {
    /// Stable identifier.
    pub id: String,
    /// Display name, unique per owner.
    pub name: String,
    /// User id of the group's owner.
    pub owner_id: String,
    /// Whether every tenant can see this group's membership.
    pub is_public: bool,
}
