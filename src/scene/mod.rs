// src/scene/mod.rs
// 场景数据：节点、连线上的粒子、背景星空
pub mod network;
pub mod node;
pub mod particle;
pub mod starfield;

use rand::Rng;

/// Uniform sample from `[lo, hi)`, or `lo` when the range is empty.
pub(crate) fn sample_range<R: Rng + ?Sized>(rng: &mut R, [lo, hi]: [f32; 2]) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
