//! Remote embedding client over an OpenAI-compatible `/embeddings` API.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::providers::EmbeddingClient;
use ragq_domain::value_objects::Embedding;

use crate::constants::{CONTENT_TYPE_JSON, EMBEDDING_DIMENSION_REMOTE_DEFAULT, HTTP_REQUEST_TIMEOUT_SECS};
use crate::utils::check_and_parse;

/// Remote embedding client calling an OpenAI-compatible `/embeddings`
/// endpoint (OpenAI itself, or any third-party API mirroring its wire
/// format).
pub struct RemoteEmbeddingClient {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
    dimension: OnceLock<usize>,
}

impl RemoteEmbeddingClient {
    /// Build a client against `base_url` (no trailing slash expected, but
    /// tolerated) using `model` and `api_key`.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builder should not fail with static config");

        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http,
            dimension: OnceLock::new(),
        }
    }
}

#[async_trait]
impl EmbeddingClient for RemoteEmbeddingClient {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::json!({
            "model": self.model,
            "input": texts,
            "encoding_format": "float",
        });

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::network_with_source("embedding request failed", e))?;

        let body = check_and_parse(response, "embedding").await?;

        let mut data: Vec<(usize, Vec<f32>)> = body["data"]
            .as_array()
            .ok_or_else(|| Error::upstream("embedding response missing data array"))?
            .iter()
            .map(|item| {
                let index = item["index"].as_u64().unwrap_or(0) as usize;
                let vector = item["embedding"]
                    .as_array()
                    .map(|values| values.iter().map(|v| v.as_f64().unwrap_or(0.0) as f32).collect())
                    .unwrap_or_default();
                (index, vector)
            })
            .collect();

        if data.len() != texts.len() {
            return Err(Error::upstream(format!(
                "embedding response returned {} vectors for {} inputs",
                data.len(),
                texts.len()
            )));
        }

        data.sort_by_key(|(index, _)| *index);

        let embeddings: Vec<Embedding> = data
            .into_iter()
            .map(|(_, vector)| {
                let normalized = l2_normalize(vector);
                let dimensions = normalized.len();
                Embedding {
                    vector: normalized,
                    model: self.model.clone(),
                    dimensions,
                }
            })
            .collect();

        if let Some(first) = embeddings.first() {
            let _ = self.dimension.set(first.dimensions);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
            .get()
            .copied()
            .or(Some(EMBEDDING_DIMENSION_REMOTE_DEFAULT))
    }

    fn max_batch_size(&self) -> usize {
        crate::constants::EMBEDDING_MAX_BATCH_SIZE
    }
}

fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_vector() {
        let v = l2_normalize(vec![3.0, 4.0]);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector_untouched() {
        let v = l2_normalize(vec![0.0, 0.0]);
        assert_eq!(v, vec![0.0, 0.0]);
    }
}
