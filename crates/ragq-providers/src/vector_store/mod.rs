//! Vector store client adapter (C2): Qdrant over its HTTP REST API.

mod qdrant;

pub use qdrant::QdrantClient;
