//! Beta distribution over p in (0, 1)
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::impl_display;
use crate::misc::{ln_beta, rvs, xlogy};
use crate::traits::BaseMeasure;
use rand::Rng;
use std::cell::OnceCell;
use thiserror::Error;

mod binomial_prior;

/// [Beta distribution](https://en.wikipedia.org/wiki/Beta_distribution),
/// Beta(α, β) over p in (0, 1).
///
/// The base measure over success probabilities and, via
/// [`ConjugatePrior`](crate::traits::ConjugatePrior), the conjugate prior of
/// the [`Binomial`](crate::dist::Binomial) likelihood.
///
/// # Examples
///
/// ```rust
/// use dpmix::dist::Beta;
/// use dpmix::traits::BaseMeasure;
///
/// let beta = Beta::new(2.0, 2.0).unwrap();
/// // density is symmetric about 1/2
/// assert!((beta.ln_f(&0.2) - beta.ln_f(&0.8)).abs() < 1E-12);
///
/// // Outside the support the density is zero
/// assert_eq!(beta.ln_f(&1.2), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Beta {
    alpha: f64,
    beta: f64,
    #[cfg_attr(feature = "serde1", serde(skip))]
    /// Cached ln(Beta(a, b))
    ln_beta_ab: OnceCell<f64>,
}

impl PartialEq for Beta {
    fn eq(&self, other: &Beta) -> bool {
        self.alpha == other.alpha && self.beta == other.beta
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum BetaError {
    /// The alpha parameter is less than or equal to zero
    #[error("alpha ({alpha}) must be greater than zero")]
    AlphaTooLow { alpha: f64 },
    /// The alpha parameter is infinite or NaN
    #[error("alpha ({alpha}) must be finite")]
    AlphaNotFinite { alpha: f64 },
    /// The beta parameter is less than or equal to zero
    #[error("beta ({beta}) must be greater than zero")]
    BetaTooLow { beta: f64 },
    /// The beta parameter is infinite or NaN
    #[error("beta ({beta}) must be finite")]
    BetaNotFinite { beta: f64 },
}

impl Beta {
    /// Create a `Beta` distribution with shape parameters α and β.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dpmix::dist::Beta;
    /// assert!(Beta::new(1.0, 2.0).is_ok());
    /// assert!(Beta::new(0.0, 2.0).is_err());
    /// assert!(Beta::new(1.0, f64::INFINITY).is_err());
    /// ```
    pub fn new(alpha: f64, beta: f64) -> Result<Self, BetaError> {
        if alpha <= 0.0 {
            Err(BetaError::AlphaTooLow { alpha })
        } else if !alpha.is_finite() {
            Err(BetaError::AlphaNotFinite { alpha })
        } else if beta <= 0.0 {
            Err(BetaError::BetaTooLow { beta })
        } else if !beta.is_finite() {
            Err(BetaError::BetaNotFinite { beta })
        } else {
            Ok(Beta::new_unchecked(alpha, beta))
        }
    }

    /// Creates a new Beta without checking whether the parameters are valid.
    #[inline]
    pub fn new_unchecked(alpha: f64, beta: f64) -> Self {
        Beta {
            alpha,
            beta,
            ln_beta_ab: OnceCell::new(),
        }
    }

    /// Create a `Beta` distribution with the uniform distribution on (0, 1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use dpmix::dist::Beta;
    /// let beta = Beta::uniform();
    /// assert_eq!(beta, Beta::new(1.0, 1.0).unwrap());
    /// ```
    #[inline]
    pub fn uniform() -> Self {
        Beta::new_unchecked(1.0, 1.0)
    }

    /// Create a `Beta` distribution with the Jeffrey's parameterization,
    /// *Beta(0.5, 0.5)*.
    #[inline]
    pub fn jeffreys() -> Self {
        Beta::new_unchecked(0.5, 0.5)
    }

    /// Get the alpha parameter
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the beta parameter
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    #[inline]
    fn ln_beta_ab(&self) -> f64 {
        *self.ln_beta_ab.get_or_init(|| ln_beta(self.alpha, self.beta))
    }
}

impl Default for Beta {
    fn default() -> Self {
        Beta::jeffreys()
    }
}

impl From<&Beta> for String {
    fn from(beta: &Beta) -> String {
        format!("Beta(α: {}, β: {})", beta.alpha, beta.beta)
    }
}

impl_display!(Beta);

impl BaseMeasure<f64> for Beta {
    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        rvs::draw_beta(self.alpha, self.beta, rng)
    }

    fn ln_f(&self, p: &f64) -> f64 {
        if !(0.0..=1.0).contains(p) {
            return f64::NEG_INFINITY;
        }
        xlogy(self.alpha - 1.0, *p) + xlogy(self.beta - 1.0, 1.0 - p)
            - self.ln_beta_ab()
    }
}
