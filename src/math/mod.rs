//! Vector-math backends
//!
//! All similarity math goes through the [`VectorMath`] trait so the engine
//! never knows which implementation is active. Two implementations ship with
//! the crate: [`AcceleratedMath`] (ndarray) and [`ReferenceMath`] (scalar
//! loops). They must agree within floating tolerance on every operation.

pub mod accelerated;
pub mod reference;

pub use accelerated::AcceleratedMath;
pub use reference::ReferenceMath;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorIndexError};

/// Numeric operations required by the index.
///
/// Contracts:
/// - `normalize` returns `v / ||v||`; a zero vector is returned unchanged.
/// - `dot_product` and `add_vectors` require equal lengths.
/// - `cosine_similarity` returns `0.0` when either operand has zero norm.
///   That is a deliberate policy so zero vectors rank below any real match
///   instead of poisoning results with NaN.
pub trait VectorMath: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn normalize(&self, v: &[f32]) -> Vec<f32>;

    fn dot_product(&self, a: &[f32], b: &[f32]) -> Result<f32>;

    fn cosine_similarity(&self, a: &[f32], b: &[f32]) -> Result<f32>;

    fn add_vectors(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;
}

/// Which math implementation to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathBackend {
    #[default]
    Accelerated,
    Reference,
}

/// Guard shared by all implementations: both operands must have the same
/// length.
pub(crate) fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(VectorIndexError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Resolve a backend kind to a live implementation.
///
/// Runs a small numeric probe against the contract before handing the
/// backend out; a failing probe surfaces as `BackendUnavailable`, which is
/// fatal to `initialize()`.
pub fn load_backend(kind: MathBackend) -> Result<Arc<dyn VectorMath>> {
    let backend: Arc<dyn VectorMath> = match kind {
        MathBackend::Accelerated => Arc::new(AcceleratedMath::new()),
        MathBackend::Reference => Arc::new(ReferenceMath::new()),
    };
    self_check(backend.as_ref())?;
    Ok(backend)
}

/// Probe a backend against the numeric contract. Used on every backend the
/// index is handed, including injected ones.
pub(crate) fn self_check(backend: &dyn VectorMath) -> Result<()> {
    let probe = [3.0_f32, 4.0, 0.0];

    let unit = backend.normalize(&probe);
    let norm = backend.dot_product(&unit, &unit)?.sqrt();
    // Inverted comparison so NaN also fails the probe
    if !((norm - 1.0).abs() <= 1e-4) {
        return Err(VectorIndexError::BackendUnavailable(format!(
            "{} failed normalization probe (unit norm {})",
            backend.name(),
            norm
        )));
    }

    let self_similarity = backend.cosine_similarity(&probe, &probe)?;
    if !((self_similarity - 1.0).abs() <= 1e-4) {
        return Err(VectorIndexError::BackendUnavailable(format!(
            "{} failed similarity probe (cos(v, v) = {})",
            backend.name(),
            self_similarity
        )));
    }

    Ok(())
}
