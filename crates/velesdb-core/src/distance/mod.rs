//! Distance kernels for vector comparison.
//!
//! Three tiers exist: [`scalar`] (always correct, always available),
//! [`simd256`] (portable 8-lane `wide::f32x8`), and [`simd512`] (raw
//! AVX-512F intrinsics, `x86_64` only). [`dispatch`] picks the widest tier
//! the running CPU supports once, then caches the choice.

mod dispatch;
mod scalar;
mod simd256;
#[cfg(target_arch = "x86_64")]
mod simd512;

use serde::{Deserialize, Serialize};

/// Which similarity measure a collection was created with.
///
/// `Cosine` and `InnerProduct` return a *distance* (lower is closer); raw
/// cosine similarity and dot product are both negated/complemented so that
/// smaller values mean "more similar" across all three metrics, matching
/// how the HNSW graph orders candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity(a, b)`.
    Cosine,
    /// Euclidean (L2) distance.
    Euclidean,
    /// Negated dot product, so that a higher raw dot product is "closer".
    InnerProduct,
}

impl DistanceMetric {
    /// Computes the distance between two vectors of length `dim` under this metric.
    ///
    /// Only reads `a[..dim]` and `b[..dim]`; both slices must be at least
    /// `dim` elements long.
    #[inline]
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32], dim: usize) -> f32 {
        match self {
            Self::Cosine => dispatch::cosine(a, b, dim),
            Self::Euclidean => dispatch::l2(a, b, dim),
            Self::InnerProduct => -dispatch::dot(a, b, dim),
        }
    }
}

/// Detected SIMD capability of the running CPU, cached for diagnostics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdTier {
    /// Raw AVX-512F intrinsics (`x86_64` only).
    Avx512,
    /// Portable 8-lane kernels via the `wide` crate.
    Wide256,
}

impl SimdTier {
    /// Returns the tier that [`dispatch`] selected for this process.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx512f") {
                return Self::Avx512;
            }
        }
        Self::Wide256
    }

    /// Short identifier suitable for a log line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avx512 => "avx512",
            Self::Wide256 => "wide256",
        }
    }
}

/// Computes the dot product of `a` and `b`, reading only the first `dim` elements.
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32], dim: usize) -> f32 {
    dispatch::dot(a, b, dim)
}

/// Computes the Euclidean (L2) distance between `a` and `b`.
#[inline]
#[must_use]
pub fn l2(a: &[f32], b: &[f32], dim: usize) -> f32 {
    dispatch::l2(a, b, dim)
}

/// Computes `1 - cosine_similarity(a, b)`, returning `1.0` for a zero vector.
#[inline]
#[must_use]
pub fn cosine(a: &[f32], b: &[f32], dim: usize) -> f32 {
    dispatch::cosine(a, b, dim)
}

/// L2-normalizes `v` in place over its first `dim` elements.
///
/// A zero vector (norm below `f32::EPSILON`) is left untouched rather than
/// divided by zero.
pub fn normalize(v: &mut [f32], dim: usize) {
    let norm = dispatch::scalar_dot(v, v, dim).sqrt();
    if norm <= f32::EPSILON {
        return;
    }
    for x in &mut v[..dim] {
        *x /= norm;
    }
}
