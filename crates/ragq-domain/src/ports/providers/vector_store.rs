//! Vector Store Client Port (C2)

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Distance metric a collection is created with. Cosine is the only metric
/// this service uses, but the type exists so `ensure_collection` has a
/// place to say so explicitly rather than hard-coding it in every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Cosine similarity.
    Cosine,
}

/// A single point to upsert: id, vector, and an arbitrary JSON payload.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    /// Point id, also the chunk or knowledge-entry id it represents.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Arbitrary payload, e.g. the chunk wire format of `SPEC_FULL.md` §6.
    pub payload: HashMap<String, Value>,
}

/// A conjunction of field-equality predicates. `must` entries are ANDed;
/// empty means "no filter".
#[derive(Debug, Clone, Default)]
pub struct VectorFilter {
    /// Field name → required value, ANDed together.
    pub must: HashMap<String, Value>,
    /// Field name → set of acceptable values (an OR within this field,
    /// ANDed with everything else) — used for `group_id IN group_ids`.
    pub must_any_of: HashMap<String, Vec<Value>>,
}

impl VectorFilter {
    /// An empty filter matching every point.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether this filter has no predicates at all.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_any_of.is_empty()
    }
}

/// One ranked result from [`VectorStoreClient::search`].
#[derive(Debug, Clone)]
pub struct VectorSearchHit {
    /// The matched point's id.
    pub id: String,
    /// Similarity score under the collection's configured metric.
    pub score: f32,
    /// The point's stored payload.
    pub payload: HashMap<String, Value>,
}

/// A page of results from [`VectorStoreClient::scroll`].
#[derive(Debug, Clone)]
pub struct ScrollPage {
    /// Points in this page.
    pub points: Vec<VectorSearchHit>,
    /// Opaque cursor for the next page, `None` once exhausted.
    pub next_cursor: Option<String>,
}

/// Upsert/search/filter of points within a named collection.
///
/// Implementations (C2) are the only place HTTP/wire details for a vector
/// database backend live; everything above this port speaks only in terms
/// of collections, points, and filters.
#[async_trait]
pub trait VectorStoreClient: Send + Sync {
    /// Create the collection if it does not already exist, with the given
    /// vector dimension and distance metric. Idempotent.
    async fn ensure_collection(
        &self,
        collection: &str,
        dim: usize,
        metric: DistanceMetric,
    ) -> Result<()>;

    /// Insert or overwrite points by id. Idempotent: upserting the same id
    /// twice replaces the point rather than duplicating it.
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()>;

    /// Find the `k` nearest points to `query_vector` matching `filter`,
    /// dropping any scoring below `min_score` when set.
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        k: usize,
        filter: &VectorFilter,
        min_score: Option<f32>,
    ) -> Result<Vec<VectorSearchHit>>;

    /// Delete points by id.
    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()>;

    /// Delete every point matching `filter`.
    async fn delete_by_filter(&self, collection: &str, filter: &VectorFilter) -> Result<()>;

    /// Page through every point in a collection, oldest-insertion-first is
    /// not guaranteed — only that a full scroll visits every point once.
    async fn scroll(
        &self,
        collection: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ScrollPage>;

    /// Replace the payload of the given ids without touching their
    /// vectors.
    async fn set_payload(
        &self,
        collection: &str,
        ids: &[String],
        payload: HashMap<String, Value>,
    ) -> Result<()>;

    /// Whether the given collection exists.
    async fn collection_exists(&self, collection: &str) -> Result<bool>;
}
