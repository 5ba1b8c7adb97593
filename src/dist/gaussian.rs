//! Gaussian/Normal likelihood over x in (-∞, ∞)
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::impl_display;
use crate::consts::HALF_LN_2PI;
use crate::traits::Density;

/// The mean and precision (inverse variance) of a Gaussian cluster
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GaussianParams {
    pub mean: f64,
    pub precision: f64,
}

impl GaussianParams {
    #[inline]
    pub fn new(mean: f64, precision: f64) -> Self {
        GaussianParams { mean, precision }
    }

    /// Standard deviation, 1/√precision
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.precision.recip().sqrt()
    }
}

impl From<&GaussianParams> for String {
    fn from(params: &GaussianParams) -> String {
        format!("N(μ: {}, τ: {})", params.mean, params.precision)
    }
}

impl_display!(GaussianParams);

/// Gaussian / [Normal](https://en.wikipedia.org/wiki/Normal_distribution)
/// likelihood, N(x | μ, 1/τ), parameterized by [`GaussianParams`].
///
/// # Example
///
/// ```rust
/// use dpmix::dist::{Gaussian, GaussianParams};
/// use dpmix::traits::Density;
///
/// let params = GaussianParams::new(0.0, 1.0);
/// let ln_f = Gaussian.ln_f(&0.0, &params);
/// assert!((ln_f + 0.918_938_533_204_672_7).abs() < 1E-12);
///
/// // A cluster with zero variance only supports its mean
/// let point = GaussianParams::new(1.0, f64::INFINITY);
/// assert_eq!(Gaussian.ln_f(&1.0, &point), 0.0);
/// assert_eq!(Gaussian.ln_f(&1.1, &point), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Gaussian;

impl Density<f64, GaussianParams> for Gaussian {
    fn ln_f(&self, x: &f64, params: &GaussianParams) -> f64 {
        let GaussianParams { mean, precision } = *params;
        if precision.is_nan() || precision <= 0.0 {
            f64::NEG_INFINITY
        } else if precision.is_infinite() {
            if *x == mean {
                0.0
            } else {
                f64::NEG_INFINITY
            }
        } else {
            let d = x - mean;
            (0.5 * precision * d).mul_add(-d, 0.5 * precision.ln()) - HALF_LN_2PI
        }
    }
}
