//! Poisson likelihood over counts
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::misc::xlogy;
use crate::traits::Density;
use special::Gamma as _;

/// [Poisson](https://en.wikipedia.org/wiki/Poisson_distribution) likelihood
/// of a count given the rate λ of the cluster.
///
/// # Example
///
/// ```rust
/// use dpmix::dist::Poisson;
/// use dpmix::traits::Density;
///
/// // P(x = 0 | λ = 2) = e^-2
/// assert!((Poisson.ln_f(&0, &2.0) + 2.0).abs() < 1E-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Poisson;

impl Density<u32, f64> for Poisson {
    fn ln_f(&self, x: &u32, rate: &f64) -> f64 {
        if rate.is_nan() || *rate < 0.0 {
            return f64::NEG_INFINITY;
        }
        let k = f64::from(*x);
        xlogy(k, *rate) - rate - (k + 1.0).ln_gamma().0
    }
}
