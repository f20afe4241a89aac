//! Reference math backend: straightforward scalar loops.
//!
//! Exists as the portable fallback and as the ground truth the accelerated
//! backend is checked against.

use crate::error::Result;
use crate::math::{check_dimensions, VectorMath};

/// Scalar-loop implementation of the vector-math contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceMath;

impl ReferenceMath {
    pub fn new() -> Self {
        Self
    }
}

impl VectorMath for ReferenceMath {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn normalize(&self, v: &[f32]) -> Vec<f32> {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            return v.to_vec();
        }
        v.iter().map(|x| x / norm).collect()
    }

    fn dot_product(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
    }

    fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;

        let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denominator = norm_a * norm_b;
        if denominator == 0.0 {
            return Ok(0.0);
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        Ok(dot / denominator)
    }

    fn add_vectors(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        check_dimensions(a, b)?;
        Ok(a.iter().zip(b.iter()).map(|(x, y)| x + y).collect())
    }
}
