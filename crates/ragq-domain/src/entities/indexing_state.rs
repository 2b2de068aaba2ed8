//! Durable incremental-indexing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-file record used to compute the new/modified/deleted set on the next
/// incremental pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileIndexRecord {
    /// SHA-256 of the file's content at last successful index.
    pub content_hash: String,
    /// Filesystem modification time at last successful index, used as a
    /// cheap pre-filter before the authoritative content-hash comparison.
    pub modified_at: DateTime<Utc>,
    /// When this file was last successfully indexed.
    pub last_indexed_at: DateTime<Utc>,
    /// Vector-store point ids produced from this file, needed to delete
    /// them if the file is later removed or re-chunked differently.
    pub point_ids: Vec<String>,
}

/// A durable map from source file path to its [`FileIndexRecord`].
///
/// Owned by the ingestion coordinator and persisted through
/// `ragq_domain::ports::infrastructure::StateStoreProvider`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IndexingState {
    /// File path → indexing record.
    pub files: HashMap<String, FileIndexRecord>,
}

impl IndexingState {
    /// An empty state, as used before the first successful index.
    pub fn empty() -> Self {
        Self::default()
    }
}
