//! Age-indexed energy capacity.
//!
//! Capacity follows the shape of a Beta(α, β) density over the normalized
//! lifespan: it rises through youth, peaks at the mode, and decays with
//! senescence. The density is divided by its value at the mode, so the curve
//! spans exactly `[floor, floor + span]`.

use crate::config::LifecycleConfig;
use rand::Rng;

/// Unnormalized Beta kernel `x^(α-1) * (1-x)^(β-1)`.
#[inline]
fn beta_kernel(x: f64, alpha: f64, beta: f64) -> f64 {
    x.powf(alpha - 1.0) * (1.0 - x).powf(beta - 1.0)
}

/// Position of the density peak for `α, β >= 1`.
#[must_use]
pub fn mode(alpha: f64, beta: f64) -> f64 {
    let denom = alpha + beta - 2.0;
    if denom <= 0.0 {
        0.5
    } else {
        (alpha - 1.0) / denom
    }
}

/// Noise-free capacity at `age`. Ages past `max_age` sit at the tail.
#[must_use]
pub fn capacity_curve(age: u32, lc: &LifecycleConfig) -> f64 {
    let x = (age as f64 / lc.max_age.max(1) as f64).clamp(0.0, 1.0);
    let peak = beta_kernel(mode(lc.capacity_alpha, lc.capacity_beta), lc.capacity_alpha, lc.capacity_beta);
    let shape = if peak > 0.0 {
        beta_kernel(x, lc.capacity_alpha, lc.capacity_beta) / peak
    } else {
        0.0
    };
    lc.capacity_floor + lc.capacity_span * shape
}

/// Capacity at `age` with uniform noise. The noise is dropped whenever it
/// would push the value outside `(0, floor + span)`.
pub fn max_energy<R: Rng + ?Sized>(age: u32, lc: &LifecycleConfig, rng: &mut R) -> f64 {
    let base = capacity_curve(age, lc);
    if lc.capacity_noise <= 0.0 {
        return base;
    }
    let noisy = base + rng.gen_range(-lc.capacity_noise..=lc.capacity_noise);
    if noisy > 0.0 && noisy < lc.capacity_floor + lc.capacity_span {
        noisy
    } else {
        base
    }
}
