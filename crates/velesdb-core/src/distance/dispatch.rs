//! Zero-overhead dispatch to the widest distance kernel the running CPU
//! supports, cached behind a [`OnceLock`] so the feature-detection check
//! never runs inside the HNSW search hot loop.
//!
//! Grounded on `simd_dispatch.rs`'s `OnceLock<DistanceFn>` dispatch tables.

use super::{scalar, simd256};
use std::sync::OnceLock;

type DistanceFn = fn(&[f32], &[f32], usize) -> f32;

struct DispatchTable {
    dot: DistanceFn,
    l2: DistanceFn,
    cosine: DistanceFn,
}

static TABLE: OnceLock<DispatchTable> = OnceLock::new();

fn table() -> &'static DispatchTable {
    TABLE.get_or_init(select_table)
}

fn select_table() -> DispatchTable {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx512f") {
            return DispatchTable {
                dot: dot_avx512,
                l2: l2_avx512,
                cosine: cosine_avx512,
            };
        }
    }
    DispatchTable {
        dot: simd256::dot,
        l2: simd256::l2,
        cosine: simd256::cosine,
    }
}

#[cfg(target_arch = "x86_64")]
fn dot_avx512(a: &[f32], b: &[f32], dim: usize) -> f32 {
    // SAFETY: only reachable after `is_x86_feature_detected!("avx512f")` in `select_table`.
    unsafe { super::simd512::dot(a, b, dim) }
}

#[cfg(target_arch = "x86_64")]
fn l2_avx512(a: &[f32], b: &[f32], dim: usize) -> f32 {
    // SAFETY: only reachable after `is_x86_feature_detected!("avx512f")` in `select_table`.
    unsafe { super::simd512::l2(a, b, dim) }
}

#[cfg(target_arch = "x86_64")]
fn cosine_avx512(a: &[f32], b: &[f32], dim: usize) -> f32 {
    // SAFETY: only reachable after `is_x86_feature_detected!("avx512f")` in `select_table`.
    unsafe { super::simd512::cosine(a, b, dim) }
}

#[inline]
pub(super) fn dot(a: &[f32], b: &[f32], dim: usize) -> f32 {
    (table().dot)(a, b, dim)
}

#[inline]
pub(super) fn l2(a: &[f32], b: &[f32], dim: usize) -> f32 {
    (table().l2)(a, b, dim)
}

#[inline]
pub(super) fn cosine(a: &[f32], b: &[f32], dim: usize) -> f32 {
    (table().cosine)(a, b, dim)
}

#[inline]
pub(super) fn scalar_dot(a: &[f32], b: &[f32], dim: usize) -> f32 {
    scalar::dot(a, b, dim)
}
