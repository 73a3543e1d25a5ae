//! Sparse encoding and dense/sparse weighting
//!
//! Token ids become a term-frequency sparse vector; `hybrid_scale` then
//! weights the dense side by `alpha` and the sparse side by `1 - alpha`.
//! The service scores with a dot product, so this convex weighting is what
//! realizes the fusion.

use std::collections::BTreeMap;

use crate::errors::{HybridError, Result};
use crate::vector_db::SparseValues;

/// Build a sparse vector from token ids: one entry per distinct id, valued by
/// its frequency, indices ascending
pub fn encode_sparse(token_ids: &[u32]) -> SparseValues {
    let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
    for id in token_ids {
        *counts.entry(*id).or_insert(0.0) += 1.0;
    }

    let (indices, values) = counts.into_iter().unzip();
    SparseValues { indices, values }
}

/// Reject fusion weights outside `[0, 1]` (including NaN)
pub fn check_alpha(alpha: f32) -> Result<()> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(HybridError::Configuration(format!(
            "alpha must be between 0.0 and 1.0, got {}",
            alpha
        )))
    }
}

/// Weight dense by `alpha` and sparse by `1 - alpha`.
///
/// `alpha = 1.0` is pure dense, `alpha = 0.0` pure sparse.
pub fn hybrid_scale(
    dense: &[f32],
    sparse: &SparseValues,
    alpha: f32,
) -> Result<(Vec<f32>, SparseValues)> {
    check_alpha(alpha)?;

    let dense = dense.iter().map(|v| v * alpha).collect();
    let sparse = SparseValues {
        indices: sparse.indices.clone(),
        values: sparse.values.iter().map(|v| v * (1.0 - alpha)).collect(),
    };

    Ok((dense, sparse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_encode_counts_repeats() {
        let sparse = encode_sparse(&[7592, 9061, 7592]);
        assert_eq!(sparse.indices, vec![7592, 9061]);
        assert_eq!(sparse.values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode_sparse(&[]).is_empty());
    }

    #[test]
    fn test_hybrid_scale_half() {
        let sparse = SparseValues {
            indices: vec![1, 2],
            values: vec![2.0, 4.0],
        };
        let (dense, sparse) = hybrid_scale(&[1.0, -0.5], &sparse, 0.5).unwrap();
        assert_eq!(dense, vec![0.5, -0.25]);
        assert_eq!(sparse.values, vec![1.0, 2.0]);
        assert_eq!(sparse.indices, vec![1, 2]);
    }

    #[test]
    fn test_hybrid_scale_extremes() {
        let sparse = SparseValues {
            indices: vec![3],
            values: vec![1.0],
        };

        let (dense, scaled) = hybrid_scale(&[1.0], &sparse, 1.0).unwrap();
        assert_eq!(dense, vec![1.0]);
        assert_eq!(scaled.values, vec![0.0]);

        let (dense, scaled) = hybrid_scale(&[1.0], &sparse, 0.0).unwrap();
        assert_eq!(dense, vec![0.0]);
        assert_eq!(scaled.values, vec![1.0]);
    }

    #[test]
    fn test_alpha_out_of_range() {
        assert!(check_alpha(1.5).unwrap_err().is_configuration());
        assert!(check_alpha(-0.1).is_err());
        assert!(check_alpha(f32::NAN).is_err());
        assert!(check_alpha(0.0).is_ok());
        assert!(check_alpha(1.0).is_ok());
    }

    #[quickcheck]
    fn prop_values_sum_to_token_count(ids: Vec<u32>) -> bool {
        let sparse = encode_sparse(&ids);
        sparse.values.iter().sum::<f32>() as usize == ids.len()
    }

    #[quickcheck]
    fn prop_indices_strictly_ascending(ids: Vec<u32>) -> bool {
        let sparse = encode_sparse(&ids);
        sparse.indices.len() == sparse.values.len()
            && sparse.indices.windows(2).all(|w| w[0] < w[1])
    }
}
