//! Local embedding client backed by `fastembed`'s ONNX runtime.
//!
//! `fastembed::TextEmbedding` is `!Sync`, so it cannot sit behind a shared
//! `&self` reference the way the other adapters do. It is instead owned by
//! a dedicated task and driven through a channel — the same actor shape the
//! upstream crate's local embedding provider used for the same reason.

use std::sync::OnceLock;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::{mpsc, oneshot};

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::providers::EmbeddingClient;
use ragq_domain::value_objects::Embedding;

use crate::constants::EMBEDDING_DIMENSION_FASTEMBED_DEFAULT;

enum Request {
    Encode {
        texts: Vec<String>,
        reply: oneshot::Sender<Result<Vec<Embedding>>>,
    },
}

/// Local embedding client running `AllMiniLML6V2` (or another `fastembed`
/// model) in-process, with no network dependency.
pub struct LocalEmbeddingClient {
    sender: mpsc::Sender<Request>,
    model_name: String,
    dimension: OnceLock<usize>,
}

impl LocalEmbeddingClient {
    /// Build a client around the default `AllMiniLML6V2` model.
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    /// Build a client around a specific `fastembed` model.
    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let model_name = format!("{model:?}");
        let options = InitOptions::new(model);
        let engine = TextEmbedding::try_new(options)
            .map_err(|e| Error::embedding(format!("failed to load local embedding model: {e}")))?;

        let (sender, receiver) = mpsc::channel(32);
        tokio::task::spawn_blocking(move || run_actor(engine, receiver));

        Ok(Self {
            sender,
            model_name,
            dimension: OnceLock::new(),
        })
    }
}

fn run_actor(engine: TextEmbedding, mut receiver: mpsc::Receiver<Request>) {
    while let Some(Request::Encode { texts, reply }) = receiver.blocking_recv() {
        let result = encode_batch(&engine, &texts);
        let _ = reply.send(result);
    }
}

fn encode_batch(engine: &TextEmbedding, texts: &[String]) -> Result<Vec<Embedding>> {
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let raw = engine
        .embed(refs, None)
        .map_err(|e| Error::embedding(format!("local embedding inference failed: {e}")))?;

    Ok(raw
        .into_iter()
        .map(|vector| {
            let normalized = l2_normalize(vector);
            let dimensions = normalized.len();
            Embedding {
                vector: normalized,
                model: "fastembed/all-MiniLM-L6-v2".to_string(),
                dimensions,
            }
        })
        .collect())
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

#[async_trait]
impl EmbeddingClient for LocalEmbeddingClient {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let (reply, rx) = oneshot::channel();
        self.sender
            .send(Request::Encode {
                texts: texts.to_vec(),
                reply,
            })
            .await
            .map_err(|_| Error::embedding("local embedding worker is no longer running"))?;

        let embeddings = rx
            .await
            .map_err(|_| Error::embedding("local embedding worker dropped the reply channel"))??;

        if let Some(first) = embeddings.first() {
            let _ = self.dimension.set(first.dimensions);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
            .get()
            .copied()
            .or(Some(EMBEDDING_DIMENSION_FASTEMBED_DEFAULT))
    }

    fn max_batch_size(&self) -> usize {
        crate::constants::EMBEDDING_MAX_BATCH_SIZE
    }
}

impl std::fmt::Debug for LocalEmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbeddingClient")
            .field("model_name", &self.model_name)
            .finish()
    }
}
