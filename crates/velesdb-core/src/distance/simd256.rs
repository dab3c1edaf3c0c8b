//! 256-bit (8-lane f32) distance kernels using the portable `wide` crate.
//!
//! `wide::f32x8` maps to AVX2 on `x86_64`, to paired NEON registers on
//! `aarch64`, and to SIMD128 on `wasm32` — one implementation serves as the
//! correct fallback tier beneath the hand-tuned 512-bit AVX-512 path on
//! `x86_64`, grounded on `simd_explicit.rs`'s use of `wide::f32x8`.

use wide::f32x8;

const LANES: usize = 8;

#[inline]
pub(super) fn dot(a: &[f32], b: &[f32], dim: usize) -> f32 {
    let simd_len = dim / LANES;
    let mut sum = f32x8::ZERO;

    for i in 0..simd_len {
        let off = i * LANES;
        let va = f32x8::from(&a[off..off + LANES]);
        let vb = f32x8::from(&b[off..off + LANES]);
        sum = va.mul_add(vb, sum);
    }

    let mut result = sum.reduce_add();
    let base = simd_len * LANES;
    for i in base..dim {
        result += a[i] * b[i];
    }
    result
}

#[inline]
pub(super) fn squared_l2(a: &[f32], b: &[f32], dim: usize) -> f32 {
    let simd_len = dim / LANES;
    let mut sum = f32x8::ZERO;

    for i in 0..simd_len {
        let off = i * LANES;
        let va = f32x8::from(&a[off..off + LANES]);
        let vb = f32x8::from(&b[off..off + LANES]);
        let diff = va - vb;
        sum = diff.mul_add(diff, sum);
    }

    let mut result = sum.reduce_add();
    let base = simd_len * LANES;
    for i in base..dim {
        let diff = a[i] - b[i];
        result += diff * diff;
    }
    result
}

#[inline]
pub(super) fn l2(a: &[f32], b: &[f32], dim: usize) -> f32 {
    squared_l2(a, b, dim).sqrt()
}

#[inline]
pub(super) fn norm_squared(v: &[f32], dim: usize) -> f32 {
    let simd_len = dim / LANES;
    let mut sum = f32x8::ZERO;
    for i in 0..simd_len {
        let off = i * LANES;
        let vv = f32x8::from(&v[off..off + LANES]);
        sum = vv.mul_add(vv, sum);
    }
    let mut result = sum.reduce_add();
    let base = simd_len * LANES;
    for i in base..dim {
        result += v[i] * v[i];
    }
    result
}

#[inline]
pub(super) fn cosine(a: &[f32], b: &[f32], dim: usize) -> f32 {
    let d = dot(a, b, dim);
    let denom = (norm_squared(a, dim) * norm_squared(b, dim)).sqrt();
    if denom <= f32::EPSILON {
        return 1.0;
    }
    1.0 - d / denom
}
