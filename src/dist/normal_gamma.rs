//! Normal-Gamma distribution over the mean and precision of a Gaussian
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::impl_display;
use crate::dist::{Gamma, Gaussian, GaussianParams};
use crate::misc::rvs;
use crate::traits::{BaseMeasure, Density};
use rand::Rng;
use thiserror::Error;

mod gaussian_prior;

/// Prior for Gaussian parameters, NG(m, r, s, ν).
///
/// ```math
/// τ ~ Gamma(ν/2, rate = s/2)
/// μ | τ ~ N(m, 1/(rτ))
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct NormalGamma {
    m: f64,
    r: f64,
    s: f64,
    v: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum NormalGammaError {
    /// The m parameter is infinite or NaN
    #[error("m ({m}) must be finite")]
    MNotFinite { m: f64 },
    /// The r parameter is less than or equal to zero
    #[error("r ({r}) must be greater than zero")]
    RTooLow { r: f64 },
    /// The r parameter is infinite or NaN
    #[error("r ({r}) must be finite")]
    RNotFinite { r: f64 },
    /// The s parameter is less than or equal to zero
    #[error("s ({s}) must be greater than zero")]
    STooLow { s: f64 },
    /// The s parameter is infinite or NaN
    #[error("s ({s}) must be finite")]
    SNotFinite { s: f64 },
    /// The v parameter is less than or equal to zero
    #[error("v ({v}) must be greater than zero")]
    VTooLow { v: f64 },
    /// The v parameter is infinite or NaN
    #[error("v ({v}) must be finite")]
    VNotFinite { v: f64 },
}

impl NormalGamma {
    /// Create a new Normal Gamma distribution
    ///
    /// # Arguments
    /// - m: The prior mean
    /// - r: Relative precision of μ versus data
    /// - s: The mean of rho (the precision) is v/s.
    /// - v: Degrees of freedom of precision of rho
    ///
    /// ```rust
    /// # use dpmix::dist::NormalGamma;
    /// assert!(NormalGamma::new(0.0, 1.0, 1.0, 1.0).is_ok());
    /// assert!(NormalGamma::new(0.0, 0.0, 1.0, 1.0).is_err());
    /// ```
    pub fn new(
        m: f64,
        r: f64,
        s: f64,
        v: f64,
    ) -> Result<Self, NormalGammaError> {
        if !m.is_finite() {
            Err(NormalGammaError::MNotFinite { m })
        } else if !r.is_finite() {
            Err(NormalGammaError::RNotFinite { r })
        } else if !s.is_finite() {
            Err(NormalGammaError::SNotFinite { s })
        } else if !v.is_finite() {
            Err(NormalGammaError::VNotFinite { v })
        } else if r <= 0.0 {
            Err(NormalGammaError::RTooLow { r })
        } else if s <= 0.0 {
            Err(NormalGammaError::STooLow { s })
        } else if v <= 0.0 {
            Err(NormalGammaError::VTooLow { v })
        } else {
            Ok(NormalGamma { m, r, s, v })
        }
    }

    /// Creates a new NormalGamma without checking whether the parameters are
    /// valid.
    #[inline]
    pub fn new_unchecked(m: f64, r: f64, s: f64, v: f64) -> Self {
        NormalGamma { m, r, s, v }
    }

    #[inline]
    pub fn m(&self) -> f64 {
        self.m
    }

    #[inline]
    pub fn r(&self) -> f64 {
        self.r
    }

    #[inline]
    pub fn s(&self) -> f64 {
        self.s
    }

    #[inline]
    pub fn v(&self) -> f64 {
        self.v
    }
}

impl From<&NormalGamma> for String {
    fn from(ng: &NormalGamma) -> String {
        format!(
            "Normal-Gamma(m: {}, r: {}, s: {}, ν: {})",
            ng.m, ng.r, ng.s, ng.v
        )
    }
}

impl_display!(NormalGamma);

impl BaseMeasure<GaussianParams> for NormalGamma {
    fn draw<R: Rng>(&self, rng: &mut R) -> GaussianParams {
        let precision = rvs::draw_gamma(self.v / 2.0, self.s / 2.0, rng);
        let mean = rvs::draw_gaussian(self.m, self.r * precision, rng);
        GaussianParams { mean, precision }
    }

    fn ln_f(&self, params: &GaussianParams) -> f64 {
        let rho = params.precision;
        if !(rho > 0.0 && rho.is_finite()) {
            return f64::NEG_INFINITY;
        }
        let lnf_rho =
            Gamma::new_unchecked(self.v / 2.0, self.s / 2.0).ln_f(&rho);
        let lnf_mu =
            Gaussian.ln_f(&params.mean, &GaussianParams::new(self.m, self.r * rho));
        lnf_rho + lnf_mu
    }
}
