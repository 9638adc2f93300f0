use sea_orm::prelude::PgVector;

use crate::error::{BookError, BookResult};

/// Output width of all-MiniLM-L6-v2; also the width of the `books.embedding` column
pub const EMBEDDING_DIMENSION: usize = 384;

/// A vector of exactly [`EMBEDDING_DIMENSION`] values.
///
/// Built only through `TryFrom<Vec<f32>>` or `TryFrom<PgVector>`, both of
/// which reject any other length.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Cosine distance (`1 - cos θ`), the metric behind pgvector's `<=>`.
    ///
    /// A zero vector has no direction; its distance to anything is 1.
    pub fn cosine_distance(&self, other: &Embedding) -> f32 {
        let (mut dot, mut a2, mut b2) = (0.0f32, 0.0f32, 0.0f32);
        for (a, b) in self.0.iter().zip(&other.0) {
            dot += a * b;
            a2 += a * a;
            b2 += b * b;
        }
        if a2 == 0.0 || b2 == 0.0 {
            return 1.0;
        }
        1.0 - dot / (a2.sqrt() * b2.sqrt())
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = BookError;

    fn try_from(values: Vec<f32>) -> BookResult<Self> {
        if values.len() != EMBEDDING_DIMENSION {
            return Err(BookError::EmbeddingShape {
                expected: EMBEDDING_DIMENSION,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }
}

impl TryFrom<PgVector> for Embedding {
    type Error = BookError;

    fn try_from(vector: PgVector) -> BookResult<Self> {
        Self::try_from(Vec::<f32>::from(vector))
    }
}

impl From<&Embedding> for PgVector {
    fn from(embedding: &Embedding) -> Self {
        PgVector::from(embedding.0.clone())
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(axis: usize) -> Embedding {
        let mut v = vec![0.0; EMBEDDING_DIMENSION];
        v[axis] = 1.0;
        Embedding::try_from(v).unwrap()
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        for len in [0, 1, 300, 383, 385, 768] {
            match Embedding::try_from(vec![0.5; len]) {
                Err(BookError::EmbeddingShape { expected, actual }) => {
                    assert_eq!(expected, 384);
                    assert_eq!(actual, len);
                }
                other => panic!("length {} gave {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_pgvector_conversion_keeps_values() {
        let original = Embedding::try_from(
            (0..EMBEDDING_DIMENSION)
                .map(|i| i as f32 / 1000.0)
                .collect::<Vec<_>>(),
        )
        .unwrap();

        let vector = PgVector::from(&original);
        assert_eq!(vector.as_slice(), original.as_slice());
        assert_eq!(Embedding::try_from(vector).unwrap(), original);
    }

    #[test]
    fn test_pgvector_with_wrong_length_is_shape_error() {
        let err = Embedding::try_from(PgVector::from(vec![1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, BookError::EmbeddingShape { actual: 3, .. }));
    }

    #[test]
    fn test_cosine_distance() {
        let a = unit(0);
        let b = unit(1);
        assert!(a.cosine_distance(&a).abs() < 1e-6);
        assert!((a.cosine_distance(&b) - 1.0).abs() < 1e-6);

        let zero = Embedding::try_from(vec![0.0; EMBEDDING_DIMENSION]).unwrap();
        assert_eq!(zero.cosine_distance(&a), 1.0);
    }
}
