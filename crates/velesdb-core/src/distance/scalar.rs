//! Scalar fallback distance kernels.
//!
//! Always correct, always available; the vectorized tiers in
//! [`super::simd256`] and [`super::simd512`] must agree with these to a
//! tight tolerance.

#[inline]
pub(super) fn dot(a: &[f32], b: &[f32], dim: usize) -> f32 {
    a[..dim]
        .iter()
        .zip(&b[..dim])
        .map(|(x, y)| x * y)
        .sum::<f32>()
}

#[inline]
pub(super) fn squared_l2(a: &[f32], b: &[f32], dim: usize) -> f32 {
    a[..dim]
        .iter()
        .zip(&b[..dim])
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
}

#[inline]
pub(super) fn l2(a: &[f32], b: &[f32], dim: usize) -> f32 {
    squared_l2(a, b, dim).sqrt()
}

#[inline]
pub(super) fn cosine(a: &[f32], b: &[f32], dim: usize) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a[..dim].iter().zip(&b[..dim]) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = (norm_a * norm_b).sqrt();
    if denom <= f32::EPSILON {
        return 1.0;
    }
    1.0 - dot / denom
}
