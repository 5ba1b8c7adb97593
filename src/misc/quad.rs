#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::logsumexp;
use thiserror::Error;

/// Composite Simpson's rule over a fixed, evenly spaced mesh on [a, b].
///
/// Integrands are given in log space and the integral is returned in log
/// space, so densities with tiny values (e.g. likelihoods of many
/// observations) can be integrated without underflow.
///
/// # Example
///
/// Integrate f: x<sup>2</sup> over the interval [0, 1].
///
/// ```
/// use dpmix::misc::SimpsonsRule;
///
/// let simpson = SimpsonsRule::new(0.0, 1.0, 100).unwrap();
/// let q = simpson.integrate(|x| x.powi(2));
///
/// assert!((q - 1.0 / 3.0).abs() < 1E-10);
/// ```
///
/// The mesh must have an even number of intervals
///
/// ```
/// # use dpmix::misc::SimpsonsRule;
/// assert!(SimpsonsRule::new(0.0, 1.0, 101).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct SimpsonsRule {
    a: f64,
    b: f64,
    mesh_size: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum SimpsonsRuleError {
    /// One of the interval bounds is infinite or NaN
    #[error("interval bounds must be finite, got [{a}, {b}]")]
    BoundsNotFinite { a: f64, b: f64 },
    /// The lower bound is not less than the upper bound
    #[error("lower bound ({a}) must be less than upper bound ({b})")]
    EmptyInterval { a: f64, b: f64 },
    /// Simpson's rule needs an even number of intervals
    #[error("mesh size must be even and greater than zero, got {mesh_size}")]
    InvalidMeshSize { mesh_size: usize },
}

impl SimpsonsRule {
    /// Create a new integrator over [a, b] with `mesh_size` intervals
    pub fn new(
        a: f64,
        b: f64,
        mesh_size: usize,
    ) -> Result<Self, SimpsonsRuleError> {
        if !(a.is_finite() && b.is_finite()) {
            Err(SimpsonsRuleError::BoundsNotFinite { a, b })
        } else if a >= b {
            Err(SimpsonsRuleError::EmptyInterval { a, b })
        } else if mesh_size == 0 || mesh_size % 2 != 0 {
            Err(SimpsonsRuleError::InvalidMeshSize { mesh_size })
        } else {
            Ok(SimpsonsRule { a, b, mesh_size })
        }
    }

    /// Lower bound of the interval
    #[inline]
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Upper bound of the interval
    #[inline]
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Number of intervals in the mesh
    #[inline]
    pub fn mesh_size(&self) -> usize {
        self.mesh_size
    }

    #[inline]
    fn step_size(&self) -> f64 {
        (self.b - self.a) / self.mesh_size as f64
    }

    // Knots paired with the log of their Simpson coefficient (1, 4, 2, ..., 4, 1)
    fn ln_knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let h = self.step_size();
        let ln_4 = 4.0_f64.ln();
        let ln_2 = 2.0_f64.ln();
        (0..=self.mesh_size).map(move |i| {
            let x = (i as f64).mul_add(h, self.a);
            let ln_c = if i == 0 || i == self.mesh_size {
                0.0
            } else if i % 2 == 1 {
                ln_4
            } else {
                ln_2
            };
            (x, ln_c)
        })
    }

    /// ln ∫ exp(ln_f(x)) dx over [a, b]
    pub fn log_integrate<F>(&self, ln_f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let ln_h3 = (self.step_size() / 3.0).ln();
        let terms: Vec<f64> = self
            .ln_knots()
            .map(|(x, ln_c)| ln_c + ln_f(x))
            .collect();
        logsumexp(&terms) + ln_h3
    }

    /// ∫ f(x) dx over [a, b]
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let h3 = self.step_size() / 3.0;
        self.ln_knots()
            .map(|(x, ln_c)| ln_c.exp() * f(x))
            .sum::<f64>()
            * h3
    }
}
