//! Cross-encoder reranker adapter (4.8).

mod cross_encoder;

pub use cross_encoder::CachingCrossEncoderReranker;
