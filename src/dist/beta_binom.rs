//! Beta-binomial likelihood with a precision shared by every cluster
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::data::BinomialDatum;
use crate::dist::Binomial;
use crate::misc::{ln_beta, ln_binom};
use crate::traits::{Density, GlobalParameterized};
use thiserror::Error;

/// [Beta-binomial](https://en.wikipedia.org/wiki/Beta-binomial_distribution)
/// likelihood parameterized by a per-cluster mean, m, and a global
/// precision, s.
///
/// The success probability of each trial is Beta(s·m, s·(1-m)), so the
/// clusters share their over-dispersion while keeping their own mean. The
/// precision is a global parameter and can be resampled by a
/// [`MetropolisGlobalSampler`](crate::sampler::MetropolisGlobalSampler).
///
/// # Example
///
/// ```rust
/// use dpmix::data::BinomialDatum;
/// use dpmix::dist::{BetaBinomial, Binomial};
/// use dpmix::traits::{Density, GlobalParameterized};
///
/// let mut bb = BetaBinomial::new(10.0).unwrap();
/// let x = BinomialDatum::new(3, 10);
///
/// // over-dispersion makes an extreme count likelier
/// assert!(bb.ln_f(&BinomialDatum::new(10, 10), &0.4) > Binomial.ln_f(&BinomialDatum::new(10, 10), &0.4));
///
/// // infinite precision is the binomial
/// bb.set_global(f64::INFINITY);
/// assert_eq!(bb.ln_f(&x, &0.4), Binomial.ln_f(&x, &0.4));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct BetaBinomial {
    precision: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum BetaBinomialError {
    /// The precision is less than or equal to zero
    #[error("precision ({precision}) must be greater than zero")]
    PrecisionTooLow { precision: f64 },
    /// The precision is NaN
    #[error("precision must not be NaN")]
    PrecisionIsNan,
}

impl BetaBinomial {
    /// Create a beta-binomial likelihood with global precision `precision`.
    /// An infinite precision is the binomial likelihood.
    pub fn new(precision: f64) -> Result<Self, BetaBinomialError> {
        if precision.is_nan() {
            Err(BetaBinomialError::PrecisionIsNan)
        } else if precision <= 0.0 {
            Err(BetaBinomialError::PrecisionTooLow { precision })
        } else {
            Ok(BetaBinomial { precision })
        }
    }

    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }
}

impl Density<BinomialDatum, f64> for BetaBinomial {
    fn ln_f(&self, x: &BinomialDatum, m: &f64) -> f64 {
        let s = self.precision;
        if s.is_nan() || s <= 0.0 || !(0.0..=1.0).contains(m) {
            f64::NEG_INFINITY
        } else if s.is_infinite() || *m == 0.0 || *m == 1.0 {
            Binomial.ln_f(x, m)
        } else {
            let k = f64::from(x.x);
            let n = f64::from(x.n);
            let a = s * m;
            let b = s - a;
            ln_binom(n, k) + ln_beta(a + k, b + n - k) - ln_beta(a, b)
        }
    }
}

impl GlobalParameterized for BetaBinomial {
    type Global = f64;

    fn global(&self) -> f64 {
        self.precision
    }

    fn set_global(&mut self, precision: f64) {
        self.precision = precision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist::Beta;
    use crate::traits::ConjugatePrior;

    const TOL: f64 = 1E-12;

    #[test]
    fn matches_beta_prior_predictive() {
        // s = 5, m = 0.4 is Beta(2, 3)
        let bb = BetaBinomial::new(5.0).unwrap();
        let beta = Beta::new(2.0, 3.0).unwrap();
        for x in 0..=8 {
            let datum = BinomialDatum::new(x, 8);
            assert::close(bb.ln_f(&datum, &0.4), beta.ln_pp(&datum), TOL);
        }
    }

    #[test]
    fn boundary_means() {
        let bb = BetaBinomial::new(5.0).unwrap();
        assert::close(bb.ln_f(&BinomialDatum::new(0, 8), &0.0), 0.0, TOL);
        assert_eq!(
            bb.ln_f(&BinomialDatum::new(1, 8), &0.0),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn invalid_precision_is_neg_inf() {
        let mut bb = BetaBinomial::new(5.0).unwrap();
        bb.set_global(-1.0);
        assert_eq!(
            bb.ln_f(&BinomialDatum::new(1, 8), &0.5),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn new_rejects_bad_precision() {
        assert_eq!(
            BetaBinomial::new(0.0),
            Err(BetaBinomialError::PrecisionTooLow { precision: 0.0 })
        );
        assert_eq!(
            BetaBinomial::new(f64::NAN),
            Err(BetaBinomialError::PrecisionIsNan)
        );
    }
}
