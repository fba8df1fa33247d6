//! Cosine similarity between sparse TF-IDF vectors.

use crate::services::vectorize::SparseVector;

/// Cosine similarity between two sparse vectors. TF-IDF weights are
/// non-negative, so the result lands in [0, 1]. Degenerate (zero) vectors
/// score 0.0 rather than producing NaN.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let dot = sparse_dot(a, b);
    if dot == 0.0 {
        return 0.0;
    }
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Score a query against every document vector in a corpus matrix,
/// producing one score per document in corpus order.
pub fn cosine_against_matrix(query: &SparseVector, matrix: &[SparseVector]) -> Vec<f32> {
    matrix.iter().map(|doc| cosine(query, doc)).collect()
}

fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f32 {
    // Merge walk over index-sorted entries.
    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.0.len() && j < b.0.len() {
        let (ia, wa) = a.0[i];
        let (ib, wb) = b.0[j];
        match ia.cmp(&ib) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += wa * wb;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

fn norm(v: &SparseVector) -> f32 {
    v.0.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(entries: &[(usize, f32)]) -> SparseVector {
        SparseVector(entries.to_vec())
    }

    #[test]
    fn test_identical_vectors_score_one() {
        let v = vec_of(&[(0, 0.6), (2, 0.8)]);
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        let a = vec_of(&[(0, 1.0)]);
        let b = vec_of(&[(1, 1.0)]);
        assert_eq!(cosine(&a, &b), 0.0);
    }

    #[test]
    fn test_zero_vector_scores_zero_not_nan() {
        let zero = SparseVector::default();
        assert_eq!(cosine(&zero, &zero), 0.0);
        assert_eq!(cosine(&zero, &vec_of(&[(0, 1.0)])), 0.0);
    }

    #[test]
    fn test_matrix_scoring_preserves_order_and_bounds() {
        let q = vec_of(&[(0, 1.0)]);
        let matrix = vec![
            vec_of(&[(0, 1.0)]),
            vec_of(&[(1, 1.0)]),
            vec_of(&[(0, 0.5), (1, 0.5)]),
        ];
        let scores = cosine_against_matrix(&q, &matrix);
        assert_eq!(scores.len(), 3);
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert_eq!(scores[1], 0.0);
        for s in scores {
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
