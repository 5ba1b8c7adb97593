//! Metropolis-Hastings proposals over parameter values
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::dist::{Beta, Gamma};
use crate::traits::{BaseMeasure, Proposal};
use rand::Rng;
use thiserror::Error;

/// Use a base measure as an independence proposal, q(θ'|θ) = G₀(θ').
///
/// # Example
///
/// ```rust
/// use dpmix::dist::{Beta, PriorProposal};
/// use dpmix::traits::Proposal;
///
/// let q = PriorProposal::new(Beta::new(2.0, 5.0).unwrap());
/// // The current value is ignored
/// assert_eq!(q.ln_f(&0.3, &0.1), q.ln_f(&0.3, &0.9));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct PriorProposal<B> {
    base: B,
}

impl<B> PriorProposal<B> {
    pub fn new(base: B) -> Self {
        PriorProposal { base }
    }

    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<P, B: BaseMeasure<P>> Proposal<P> for PriorProposal<B> {
    fn draw<R: Rng>(&self, _current: &P, rng: &mut R) -> P {
        self.base.draw(rng)
    }

    fn ln_f(&self, proposed: &P, _current: &P) -> f64 {
        self.base.ln_f(proposed)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProposalError {
    /// The concentration or precision is not positive
    #[error("{name} ({value}) must be greater than zero")]
    ScaleTooLow { name: &'static str, value: f64 },
    /// The concentration or precision is infinite or NaN
    #[error("{name} ({value}) must be finite")]
    ScaleNotFinite { name: &'static str, value: f64 },
}

fn validate_scale(name: &'static str, value: f64) -> Result<f64, ProposalError> {
    if !value.is_finite() {
        Err(ProposalError::ScaleNotFinite { name, value })
    } else if value <= 0.0 {
        Err(ProposalError::ScaleTooLow { name, value })
    } else {
        Ok(value)
    }
}

/// Random walk over probabilities. The proposal is
/// Beta(s·m + 1, s·(1 - m) + 1) where m is the current value, so its mode
/// sits at the current value and larger `s` means smaller steps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct BetaProposal {
    s: f64,
}

impl BetaProposal {
    /// Create a Beta proposal with concentration `s`
    ///
    /// ```rust
    /// # use dpmix::dist::BetaProposal;
    /// assert!(BetaProposal::new(10.0).is_ok());
    /// assert!(BetaProposal::new(0.0).is_err());
    /// ```
    pub fn new(s: f64) -> Result<Self, ProposalError> {
        validate_scale("s", s).map(|s| BetaProposal { s })
    }

    #[inline]
    pub fn s(&self) -> f64 {
        self.s
    }

    fn centered_at(&self, m: f64) -> Beta {
        let m = m.clamp(0.0, 1.0);
        let a = self.s.mul_add(m, 1.0);
        let b = self.s.mul_add(1.0 - m, 1.0);
        Beta::new_unchecked(a, b)
    }
}

impl Proposal<f64> for BetaProposal {
    fn draw<R: Rng>(&self, current: &f64, rng: &mut R) -> f64 {
        self.centered_at(*current).draw(rng)
    }

    fn ln_f(&self, proposed: &f64, current: &f64) -> f64 {
        self.centered_at(*current).ln_f(proposed)
    }
}

/// Random walk over positive reals. The proposal is a Gamma with mean at
/// the current value x and variance 1/`precision`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GammaProposal {
    precision: f64,
}

impl GammaProposal {
    /// Create a Gamma proposal with the given precision
    pub fn new(precision: f64) -> Result<Self, ProposalError> {
        validate_scale("precision", precision)
            .map(|precision| GammaProposal { precision })
    }

    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    fn centered_at(&self, x: f64) -> Gamma {
        let rate = x * self.precision;
        Gamma::new_unchecked(rate * x, rate)
    }
}

impl Proposal<f64> for GammaProposal {
    fn draw<R: Rng>(&self, current: &f64, rng: &mut R) -> f64 {
        self.centered_at(*current).draw(rng)
    }

    fn ln_f(&self, proposed: &f64, current: &f64) -> f64 {
        if *current <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.centered_at(*current).ln_f(proposed)
    }
}
