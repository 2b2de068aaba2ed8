//! Append-only version history for knowledge entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of change a [`VersionRecord`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The entry was created by this version.
    Create,
    /// The entry's content or metadata was edited.
    Update,
    /// The entry was deleted. Content is the last live snapshot.
    Delete,
}

/// A full-content snapshot of a [`crate::entities::KnowledgeEntry`] at a
/// point in time.
///
/// Versions are append-only and are never mutated after insertion. Rollback
/// is expressed as a new version whose content equals an older snapshot,
/// never as an edit to history (see
/// `ragq-application::use_cases::version_tracker`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionRecord {
    /// The knowledge entry this version belongs to.
    pub entry_id: String,
    /// Monotonic version number for `entry_id`, starting at 1 with no gaps.
    pub version: u32,
    /// Full content snapshot.
    pub content: String,
    /// Full metadata snapshot (title, category, keywords, tech stack, ...).
    pub metadata: Value,
    /// Why this version exists.
    pub change_kind: ChangeKind,
    /// User id of whoever made the change.
    pub actor: String,
    /// Free-text reason, e.g. `"rollback to v1"`.
    pub reason: Option<String>,
    /// When this version was recorded.
    pub created_at: DateTime<Utc>,
}
