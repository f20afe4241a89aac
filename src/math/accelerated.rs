//! Accelerated math backend delegating to ndarray.
//!
//! Stands in for an external accelerated math library; the engine only
//! depends on it through the `VectorMath` contract, so it can be swapped for
//! a native or SIMD provider without touching any caller.

use ndarray::ArrayView1;

use crate::error::Result;
use crate::math::{check_dimensions, VectorMath};

/// ndarray-backed implementation of the vector-math contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceleratedMath;

impl AcceleratedMath {
    pub fn new() -> Self {
        Self
    }
}

impl VectorMath for AcceleratedMath {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn normalize(&self, v: &[f32]) -> Vec<f32> {
        let view = ArrayView1::from(v);
        let norm = view.dot(&view).sqrt();
        if norm == 0.0 {
            return v.to_vec();
        }
        view.mapv(|x| x / norm).to_vec()
    }

    fn dot_product(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        Ok(ArrayView1::from(a).dot(&ArrayView1::from(b)))
    }

    fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        let a = ArrayView1::from(a);
        let b = ArrayView1::from(b);

        let denominator = a.dot(&a).sqrt() * b.dot(&b).sqrt();
        if denominator == 0.0 {
            return Ok(0.0);
        }
        Ok(a.dot(&b) / denominator)
    }

    fn add_vectors(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_dimensions(a, b)?;
        Ok((&ArrayView1::from(a) + &ArrayView1::from(b)).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VectorIndexError;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize() {
        let math = AcceleratedMath::new();
        let normalized = math.normalize(&[3.0, 4.0]);
        assert_relative_eq!(normalized[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(normalized[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let math = AcceleratedMath::new();
        assert_eq!(math.normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_dot_product() {
        let math = AcceleratedMath::new();
        let dot = math
            .dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0])
            .unwrap();
        assert_relative_eq!(dot, 32.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_zero_denominator_is_zero() {
        let math = AcceleratedMath::new();
        let sim = math
            .cosine_similarity(&[0.0, 0.0], &[1.0, 1.0])
            .unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_add_vectors() {
        let math = AcceleratedMath::new();
        let sum = math.add_vectors(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(sum, vec![4.0, 6.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let math = AcceleratedMath::new();
        assert!(matches!(
            math.cosine_similarity(&[1.0], &[1.0, 2.0]),
            Err(VectorIndexError::DimensionMismatch { .. })
        ));
    }
}
