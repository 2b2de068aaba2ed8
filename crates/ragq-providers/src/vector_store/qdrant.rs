//! Qdrant-backed `VectorStoreClient`.
//!
//! Talks to Qdrant's REST API directly over `reqwest` rather than through a
//! native client crate — there is no Qdrant client in the dependency set
//! this workspace carries, and REST-over-`reqwest` is the same pattern
//! every other HTTP-backed adapter in this crate uses.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::providers::{
    DistanceMetric, ScrollPage, VectorFilter, VectorPoint, VectorSearchHit, VectorStoreClient,
};

use crate::constants::{CONTENT_TYPE_JSON, HTTP_REQUEST_TIMEOUT_SECS};
use crate::utils::check_and_parse;

/// Client for a single Qdrant instance, reused across every collection the
/// service needs (chunks, semantic cache, ...).
pub struct QdrantClient {
    base_url: String,
    http: Client,
    api_key: Option<String>,
}

impl QdrantClient {
    /// Build a client against `base_url` (e.g. `http://localhost:6333`),
    /// optionally authenticating with an API key.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builder should not fail with static config");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Content-Type", CONTENT_TYPE_JSON);
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key.clone());
        }
        builder
    }
}

/// Translate a [`VectorFilter`] into Qdrant's filter DSL: `must` entries
/// become `{"key": ..., "match": {"value": ...}}` conditions, `must_any_of`
/// entries become `{"key": ..., "match": {"any": [...]}}` conditions.
fn filter_to_qdrant(filter: &VectorFilter) -> Option<Value> {
    if filter.is_empty() {
        return None;
    }

    let mut must: Vec<Value> = filter
        .must
        .iter()
        .map(|(key, value)| json!({"key": key, "match": {"value": value}}))
        .collect();

    must.extend(
        filter
            .must_any_of
            .iter()
            .map(|(key, values)| json!({"key": key, "match": {"any": values}})),
    );

    Some(json!({"must": must}))
}

fn point_to_hit(point: &Value) -> VectorSearchHit {
    let id = point["id"].as_str().map(str::to_string).unwrap_or_else(|| point["id"].to_string());
    let score = point["score"].as_f64().unwrap_or(0.0) as f32;
    let payload = point["payload"]
        .as_object()
        .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    VectorSearchHit { id, score, payload }
}

#[async_trait]
impl VectorStoreClient for QdrantClient {
    async fn ensure_collection(&self, collection: &str, dim: usize, metric: DistanceMetric) -> Result<()> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }

        let distance = match metric {
            DistanceMetric::Cosine => "Cosine",
        };

        let response = self
            .request(reqwest::Method::PUT, &format!("/collections/{collection}"))
            .json(&json!({"vectors": {"size": dim, "distance": distance}}))
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant create-collection request failed", e))?;

        check_and_parse(response, "qdrant").await?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let body = json!({
            "points": points
                .into_iter()
                .map(|p| json!({"id": p.id, "vector": p.vector, "payload": p.payload}))
                .collect::<Vec<_>>(),
        });

        let response = self
            .request(reqwest::Method::PUT, &format!("/collections/{collection}/points"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant upsert request failed", e))?;

        check_and_parse(response, "qdrant").await?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        k: usize,
        filter: &VectorFilter,
        min_score: Option<f32>,
    ) -> Result<Vec<VectorSearchHit>> {
        let mut body = json!({
            "vector": query_vector,
            "limit": k,
            "with_payload": true,
        });
        if let Some(qdrant_filter) = filter_to_qdrant(filter) {
            body["filter"] = qdrant_filter;
        }
        if let Some(threshold) = min_score {
            body["score_threshold"] = json!(threshold);
        }

        let response = self
            .request(reqwest::Method::POST, &format!("/collections/{collection}/points/search"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant search request failed", e))?;

        let parsed = check_and_parse(response, "qdrant").await?;
        let hits = parsed["result"]
            .as_array()
            .map(|arr| arr.iter().map(point_to_hit).collect())
            .unwrap_or_default();
        Ok(hits)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::POST, &format!("/collections/{collection}/points/delete"))
            .json(&json!({"points": ids}))
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant delete request failed", e))?;

        check_and_parse(response, "qdrant").await?;
        Ok(())
    }

    async fn delete_by_filter(&self, collection: &str, filter: &VectorFilter) -> Result<()> {
        let Some(qdrant_filter) = filter_to_qdrant(filter) else {
            return Err(Error::invalid_argument(
                "refusing to delete an entire collection with an empty filter",
            ));
        };

        let response = self
            .request(reqwest::Method::POST, &format!("/collections/{collection}/points/delete"))
            .json(&json!({"filter": qdrant_filter}))
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant delete-by-filter request failed", e))?;

        check_and_parse(response, "qdrant").await?;
        Ok(())
    }

    async fn scroll(&self, collection: &str, cursor: Option<&str>, limit: usize) -> Result<ScrollPage> {
        let mut body = json!({"limit": limit, "with_payload": true, "with_vector": false});
        if let Some(cursor) = cursor {
            body["offset"] = json!(cursor);
        }

        let response = self
            .request(reqwest::Method::POST, &format!("/collections/{collection}/points/scroll"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant scroll request failed", e))?;

        let parsed = check_and_parse(response, "qdrant").await?;
        let points = parsed["result"]["points"]
            .as_array()
            .map(|arr| arr.iter().map(point_to_hit).collect())
            .unwrap_or_default();
        let next_cursor = parsed["result"]["next_page_offset"]
            .as_str()
            .map(str::to_string);

        Ok(ScrollPage { points, next_cursor })
    }

    async fn set_payload(&self, collection: &str, ids: &[String], payload: HashMap<String, Value>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::POST, &format!("/collections/{collection}/points/payload"))
            .json(&json!({"points": ids, "payload": payload}))
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant set-payload request failed", e))?;

        check_and_parse(response, "qdrant").await?;
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let response = self
            .request(reqwest::Method::GET, &format!("/collections/{collection}"))
            .send()
            .await
            .map_err(|e| Error::network_with_source("qdrant collection-exists request failed", e))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_translates_to_none() {
        assert!(filter_to_qdrant(&VectorFilter::none()).is_none());
    }

    #[test]
    fn must_and_must_any_of_both_translate() {
        let mut filter = VectorFilter::none();
        filter.must.insert("owner_id".to_string(), json!("u1"));
        filter
            .must_any_of
            .insert("group_id".to_string(), vec![json!("g1"), json!("g2")]);

        let translated = filter_to_qdrant(&filter).unwrap();
        let must = translated["must"].as_array().unwrap();
        assert_eq!(must.len(), 2);
    }
}
