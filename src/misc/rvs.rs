//! Random variates used by the model components
//!
//! Continuous variates come from `rand_distr`. The discrete variates use
//! inversion of the log CDF so that extreme success probabilities do not
//! underflow.
use rand::distributions::Open01;
use rand::Rng;
use rand_distr::Distribution;

use super::{ln_normalize, logaddexp, pflip};
use crate::consts::GAMMA_DRAW_FLOOR;

/// Uniform draw on the open interval (0, 1)
#[inline]
pub fn draw_uniform<R: Rng>(rng: &mut R) -> f64 {
    rng.sample::<f64, _>(Open01)
}

/// Draw from Beta(a, b)
///
/// # Panics
///
/// Panics if either `a` or `b` is not positive and finite.
pub fn draw_beta<R: Rng>(a: f64, b: f64, rng: &mut R) -> f64 {
    rand_distr::Beta::new(a, b)
        .expect("Beta parameters must be positive and finite")
        .sample(rng)
}

/// Draw from Gamma(shape, rate)
///
/// The draw is floored at [`GAMMA_DRAW_FLOOR`] so that its log is always
/// finite.
///
/// # Panics
///
/// Panics if `shape` or `rate` is not positive and finite.
pub fn draw_gamma<R: Rng>(shape: f64, rate: f64, rng: &mut R) -> f64 {
    // rand_distr is parameterized by scale
    let x = rand_distr::Gamma::new(shape, rate.recip())
        .expect("Gamma parameters must be positive and finite")
        .sample(rng);
    x.max(GAMMA_DRAW_FLOOR)
}

/// Draw from a Gaussian given its mean and precision (inverse variance)
///
/// # Panics
///
/// Panics if `precision` is not positive.
pub fn draw_gaussian<R: Rng>(mean: f64, precision: f64, rng: &mut R) -> f64 {
    rand_distr::Normal::new(mean, precision.recip().sqrt())
        .expect("Gaussian precision must be positive")
        .sample(rng)
}

/// Draw an index with probability proportional to `weights`
#[inline]
pub fn draw_categorical<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    pflip(weights, rng)
}

/// Draw the number of successes in `n` trials with success probability `p`
///
/// Walks the log CDF from zero upward; `p > 0.5` is drawn as the complement
/// to keep the walk short.
pub fn draw_binomial<R: Rng>(n: u32, p: f64, rng: &mut R) -> u32 {
    if p > 0.5 {
        return n - draw_binomial(n, 1.0 - p, rng);
    }

    if p <= 0.0 || n == 0 {
        return 0;
    }

    let ln_u = draw_uniform(rng).ln();
    let ln_c = p.ln() - (-p).ln_1p();

    let mut ln_prob = f64::from(n) * (-p).ln_1p();
    let mut ln_cdf = ln_prob;
    let mut k = 0_u32;

    while ln_u >= ln_cdf && k < n {
        ln_prob += ln_c + f64::from(n - k).ln() - f64::from(k + 1).ln();
        ln_cdf = logaddexp(ln_cdf, ln_prob);
        k += 1;
    }
    k
}

/// Draw a Poisson count with the given `rate`
///
/// Walks the log CDF from zero upward.
pub fn draw_poisson<R: Rng>(rate: f64, rng: &mut R) -> u32 {
    if rate <= 0.0 {
        return 0;
    }

    let ln_u = draw_uniform(rng).ln();
    let ln_rate = rate.ln();

    let mut ln_prob = -rate;
    let mut ln_cdf = ln_prob;
    let mut k = 0_u32;

    // ln_cdf saturates just below zero in floating point, so cap the walk
    while ln_u >= ln_cdf && ln_prob > f64::NEG_INFINITY && k < u32::MAX {
        k += 1;
        ln_prob += ln_rate - f64::from(k).ln();
        let next = logaddexp(ln_cdf, ln_prob);
        if next == ln_cdf {
            break;
        }
        ln_cdf = next;
    }
    k
}

/// Draw from a univariate density known up to a constant by evaluating it on
/// a mesh of the interval [a, b] and drawing a mesh midpoint.
///
/// # Panics
///
/// Panics if `mesh_size` is zero or `a >= b`.
pub fn inverse_sample<F, R>(
    ln_f: F,
    a: f64,
    b: f64,
    mesh_size: usize,
    rng: &mut R,
) -> f64
where
    F: Fn(f64) -> f64,
    R: Rng,
{
    assert!(mesh_size > 0, "mesh_size must be greater than zero");
    assert!(a < b, "the interval must be non-empty");

    let h = (b - a) / mesh_size as f64;
    let midpoints: Vec<f64> = (0..mesh_size)
        .map(|i| (i as f64 + 0.5).mul_add(h, a))
        .collect();
    let ln_ws: Vec<f64> = midpoints.iter().map(|&x| ln_f(x)).collect();
    let ws: Vec<f64> = ln_normalize(&ln_ws).iter().map(|w| w.exp()).collect();
    midpoints[pflip(&ws, rng)]
}
