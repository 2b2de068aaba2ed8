//! Embedding value objects.

use serde::{Deserialize, Serialize};

/// A dense, L2-normalized text embedding.
///
/// ## Business rules
///
/// - `vector` is always unit-length: `encode()` implementations must
///   L2-normalize before returning.
/// - `dimensions` is `vector.len()`; kept alongside the vector so callers
///   can validate shape without reaching into the slice.
///
/// ## Example
///
/// ```rust
/// use ragq_domain::value_objects::Embedding;
///
/// let embedding = Embedding {
///     vector: vec![0.6, 0.8],
///     model: "text-embedding-3-small".to_string(),
///     dimensions: 2,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// The embedding vector values.
    pub vector: Vec<f32>,
    /// Name of the model that generated this embedding.
    pub model: String,
    /// Dimensionality of the embedding vector.
    pub dimensions: usize,
}

impl Embedding {
    /// Cosine similarity between two embeddings of equal dimension.
    ///
    /// Both vectors are assumed unit-length, so this is a plain dot
    /// product; returns `0.0` if the dimensions disagree.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.vector.len() != other.vector.len() {
            return 0.0;
        }
        self.vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_of_identical_unit_vectors_is_one() {
        let a = Embedding {
            vector: vec![0.6, 0.8],
            model: "m".into(),
            dimensions: 2,
        };
        let sim = a.cosine_similarity(&a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        let a = Embedding {
            vector: vec![1.0, 0.0],
            model: "m".into(),
            dimensions: 2,
        };
        let b = Embedding {
            vector: vec![0.0, 1.0],
            model: "m".into(),
            dimensions: 2,
        };
        assert!(a.cosine_similarity(&b).abs() < 1e-6);
    }

    #[test]
    fn mismatched_dimensions_return_zero() {
        let a = Embedding {
            vector: vec![1.0, 0.0],
            model: "m".into(),
            dimensions: 2,
        };
        let b = Embedding {
            vector: vec![1.0, 0.0, 0.0],
            model: "m".into(),
            dimensions: 3,
        };
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }
}
