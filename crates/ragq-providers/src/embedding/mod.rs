//! Embedding client adapters (C1): a local ONNX model and a remote
//! OpenAI-compatible embeddings API.

mod local;
mod remote;

pub use local::LocalEmbeddingClient;
pub use remote::RemoteEmbeddingClient;
