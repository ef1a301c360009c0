//! Cosine similarity over embedding vectors. Pure, no I/O.

use crate::error::SimilarityError;

/// Cosine similarity of `a` and `b`, in `[-1.0, 1.0]`.
///
/// Accumulates in `f64`. Vectors of different length are a
/// [`SimilarityError::DimensionMismatch`]; a zero-magnitude (or empty) vector
/// is a [`SimilarityError::DegenerateVector`]. Never returns NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || !norm_a.is_finite() {
        return Err(SimilarityError::DegenerateVector { which: "first" });
    }
    if norm_b == 0.0 || !norm_b.is_finite() {
        return Err(SimilarityError::DegenerateVector { which: "second" });
    }

    // Rounding can push |cos| a hair past 1.
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}
