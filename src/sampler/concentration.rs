//! Gibbs update of the Dirichlet process concentration parameter
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use thiserror::Error;

use crate::misc::rvs;

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum ConcentrationError {
    /// The shape of the Gamma prior is not positive and finite
    #[error("prior shape must be positive and finite, got {shape}")]
    InvalidShape { shape: f64 },
    /// The rate of the Gamma prior is not positive and finite
    #[error("prior rate must be positive and finite, got {rate}")]
    InvalidRate { rate: f64 },
}

/// Gibbs update of α under a Gamma(shape, rate) prior using the auxiliary
/// variable scheme of Escobar and West (1995).
///
/// Given the number of clusters, k, and of items, n:
///
/// 1. η ~ Beta(α + 1, n)
/// 2. α ~ π Gamma(a + k, b - ln η) + (1 - π) Gamma(a + k - 1, b - ln η)
///
/// where π/(1 - π) = (a + k - 1) / (n (b - ln η)).
///
/// # Example
///
/// ```rust
/// use dpmix::sampler::GammaPriorConcentration;
/// use rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256Plus;
///
/// let mut rng = Xoshiro256Plus::seed_from_u64(7);
/// let sampler = GammaPriorConcentration::new(1.0, 1.0).unwrap();
///
/// let alpha = sampler.sample(1.0, 3, 50, &mut rng);
/// assert!(alpha > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GammaPriorConcentration {
    shape: f64,
    rate: f64,
}

impl GammaPriorConcentration {
    pub fn new(shape: f64, rate: f64) -> Result<Self, ConcentrationError> {
        if !(shape.is_finite() && shape > 0.0) {
            Err(ConcentrationError::InvalidShape { shape })
        } else if !(rate.is_finite() && rate > 0.0) {
            Err(ConcentrationError::InvalidRate { rate })
        } else {
            Ok(GammaPriorConcentration { shape, rate })
        }
    }

    #[inline]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Draw a new α given the previous value, the number of clusters and
    /// the number of items.
    ///
    /// # Panics
    ///
    /// Panics if `n_items` is zero.
    pub fn sample<R: Rng>(
        &self,
        alpha: f64,
        n_clusters: usize,
        n_items: usize,
        rng: &mut R,
    ) -> f64 {
        assert!(n_items > 0, "the concentration is undefined for no items");

        let k = n_clusters as f64;
        let n = n_items as f64;

        let eta = rvs::draw_beta(alpha + 1.0, n, rng);
        let rate = self.rate - eta.ln();

        let x = (self.shape + k - 1.0) / (n * rate);
        let pi = x / (1.0 + x);

        let shape = if rng.gen::<f64>() < pi {
            self.shape + k
        } else {
            self.shape + k - 1.0
        };
        rvs::draw_gamma(shape, rate, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn new_validates() {
        assert!(GammaPriorConcentration::new(1.0, 1.0).is_ok());
        assert_eq!(
            GammaPriorConcentration::new(0.0, 1.0),
            Err(ConcentrationError::InvalidShape { shape: 0.0 })
        );
        assert_eq!(
            GammaPriorConcentration::new(1.0, f64::INFINITY),
            Err(ConcentrationError::InvalidRate {
                rate: f64::INFINITY
            })
        );
    }

    #[test]
    fn draws_are_positive_and_finite() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0xC0FFEE);
        let sampler = GammaPriorConcentration::new(0.01, 0.01).unwrap();
        let mut alpha = 1.0;
        for _ in 0..1_000 {
            alpha = sampler.sample(alpha, 1, 100, &mut rng);
            assert!(alpha > 0.0 && alpha.is_finite());
            assert!(alpha.ln().is_finite());
        }
    }

    #[test]
    fn more_clusters_means_larger_alpha() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let sampler = GammaPriorConcentration::new(1.0, 1.0).unwrap();
        let mean = |k: usize, rng: &mut Xoshiro256Plus| {
            let mut alpha = 1.0;
            let mut total = 0.0;
            for _ in 0..2_000 {
                alpha = sampler.sample(alpha, k, 100, rng);
                total += alpha;
            }
            total / 2_000.0
        };
        let few = mean(1, &mut rng);
        let many = mean(30, &mut rng);
        assert!(many > few);
    }

    #[test]
    #[should_panic]
    fn zero_items_panics() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let sampler = GammaPriorConcentration::new(1.0, 1.0).unwrap();
        sampler.sample(1.0, 0, 0, &mut rng);
    }
}
