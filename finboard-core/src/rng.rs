//! Deterministic random draws for the synthetic generators.
//!
//! Every generator owns one `StdRng` seeded from a `u64`, so a seed fully
//! determines the output. Draw order inside a generator is part of its
//! contract: reordering draws changes every value downstream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A fresh RNG for `seed`.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// One draw from N(mean, std_dev) via the Box-Muller transform.
///
/// Consumes exactly two uniforms per call.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // 1 - U keeps u1 in (0, 1] so ln never sees zero.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Round to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}
