//! Gamma distribution over x in (0, ∞)
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::impl_display;
use crate::misc::{rvs, xlogy};
use crate::traits::BaseMeasure;
use rand::Rng;
use special::Gamma as _;
use std::cell::OnceCell;
use thiserror::Error;

mod poisson_prior;

/// [Gamma distribution](https://en.wikipedia.org/wiki/Gamma_distribution) G(α, β)
/// over x in (0, ∞).
///
/// **NOTE**: The gamma distribution is parameterized in terms of shape, α, and
/// rate, β.
///
/// ```math
///             β^α
/// f(x|α, β) = ----  x^(α-1) e^(-βx)
///             Γ(α)
/// ```
///
/// Used as the base measure over Poisson rates and as the prior over
/// positive hyperparameters such as the beta-binomial precision.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Gamma {
    shape: f64,
    rate: f64,
    // ln(gamma(shape))
    #[cfg_attr(feature = "serde1", serde(skip))]
    ln_gamma_shape: OnceCell<f64>,
}

impl PartialEq for Gamma {
    fn eq(&self, other: &Gamma) -> bool {
        self.shape == other.shape && self.rate == other.rate
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum GammaError {
    /// Shape parameter is less than or equal to zero
    #[error("shape ({shape}) must be greater than zero")]
    ShapeTooLow { shape: f64 },
    /// Shape parameter is infinite or NaN
    #[error("shape ({shape}) must be finite")]
    ShapeNotFinite { shape: f64 },
    /// Rate parameter is less than or equal to zero
    #[error("rate ({rate}) must be greater than zero")]
    RateTooLow { rate: f64 },
    /// Rate parameter is infinite or NaN
    #[error("rate ({rate}) must be finite")]
    RateNotFinite { rate: f64 },
}

impl Gamma {
    /// Create a new `Gamma` distribution with shape (α) and rate (β).
    ///
    /// # Example
    ///
    /// ```rust
    /// # use dpmix::dist::Gamma;
    /// let gam = Gamma::new(2.0, 1.0).unwrap();
    /// assert_eq!(gam.shape(), 2.0);
    /// assert_eq!(gam.rate(), 1.0);
    ///
    /// assert!(Gamma::new(0.0, 1.0).is_err());
    /// assert!(Gamma::new(1.0, f64::NAN).is_err());
    /// ```
    pub fn new(shape: f64, rate: f64) -> Result<Self, GammaError> {
        if shape <= 0.0 {
            Err(GammaError::ShapeTooLow { shape })
        } else if rate <= 0.0 {
            Err(GammaError::RateTooLow { rate })
        } else if !shape.is_finite() {
            Err(GammaError::ShapeNotFinite { shape })
        } else if !rate.is_finite() {
            Err(GammaError::RateNotFinite { rate })
        } else {
            Ok(Gamma::new_unchecked(shape, rate))
        }
    }

    /// Creates a new Gamma without checking whether the parameters are valid.
    #[inline]
    pub fn new_unchecked(shape: f64, rate: f64) -> Self {
        Gamma {
            shape,
            rate,
            ln_gamma_shape: OnceCell::new(),
        }
    }

    #[inline]
    fn ln_gamma_shape(&self) -> f64 {
        *self.ln_gamma_shape.get_or_init(|| self.shape.ln_gamma().0)
    }

    /// Get the shape parameter
    #[inline]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Get the rate parameter
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Gamma::new_unchecked(1.0, 1.0)
    }
}

impl From<&Gamma> for String {
    fn from(gam: &Gamma) -> String {
        format!("G(α: {}, β: {})", gam.shape, gam.rate)
    }
}

impl_display!(Gamma);

impl BaseMeasure<f64> for Gamma {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        rvs::draw_gamma(self.shape, self.rate, rng)
    }

    fn ln_f(&self, x: &f64) -> f64 {
        if *x < 0.0 || x.is_nan() {
            return f64::NEG_INFINITY;
        }
        self.shape.mul_add(self.rate.ln(), -self.ln_gamma_shape())
            + xlogy(self.shape - 1.0, *x)
            - self.rate * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_basic_impls;

    const TOL: f64 = 1E-12;

    test_basic_impls!(Gamma::new(1.0, 2.0).unwrap());

    #[test]
    fn ln_f_exponential() {
        // G(1, 2) is Exponential(2)
        let gam = Gamma::new(1.0, 2.0).unwrap();
        assert::close(gam.ln_f(&1.5), 2.0_f64.ln() - 3.0, TOL);
    }

    #[test]
    fn ln_f_known_value() {
        let gam = Gamma::new(3.0, 2.0).unwrap();
        // 2^3 / Γ(3) * x^2 * e^(-2x) at x = 0.5
        let expected = (8.0 / 2.0 * 0.25 * (-1.0_f64).exp()).ln();
        assert::close(gam.ln_f(&0.5), expected, TOL);
    }

    #[test]
    fn ln_f_negative_is_neg_inf() {
        let gam = Gamma::new(3.0, 2.0).unwrap();
        assert_eq!(gam.ln_f(&-0.1), f64::NEG_INFINITY);
    }

    #[test]
    fn new_rejects_bad_params() {
        assert_eq!(
            Gamma::new(1.0, -2.0),
            Err(GammaError::RateTooLow { rate: -2.0 })
        );
        assert_eq!(
            Gamma::new(f64::INFINITY, 1.0),
            Err(GammaError::ShapeNotFinite {
                shape: f64::INFINITY
            })
        );
    }
}
