//! Chain configuration
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use thiserror::Error;

use super::concentration::{ConcentrationError, GammaPriorConcentration};
use crate::consts::DEFAULT_LOG_EVERY;

/// How the partition is built before the first sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum InitStrategy {
    /// Every item in its own cluster
    #[default]
    Disconnected,
    /// Every item in one shared cluster
    Connected,
}

/// Gamma(shape, rate) prior on the concentration parameter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct ConcentrationPrior {
    pub shape: f64,
    pub rate: f64,
}

impl Default for ConcentrationPrior {
    fn default() -> Self {
        ConcentrationPrior {
            shape: 1.0,
            rate: 1.0,
        }
    }
}

impl TryFrom<ConcentrationPrior> for GammaPriorConcentration {
    type Error = ConcentrationError;

    fn try_from(prior: ConcentrationPrior) -> Result<Self, Self::Error> {
        GammaPriorConcentration::new(prior.shape, prior.rate)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The initial concentration is not positive and finite
    #[error("initial alpha must be positive and finite, got {alpha}")]
    InvalidAlpha { alpha: f64 },
    #[error("invalid concentration prior: {0}")]
    AlphaPrior(#[from] ConcentrationError),
}

/// Settings for a [`DirichletProcessSampler`](super::DirichletProcessSampler)
///
/// # Example
///
/// ```rust
/// use dpmix::sampler::{ConcentrationPrior, DpConfig, InitStrategy};
///
/// let config = DpConfig::default()
///     .with_alpha(0.5)
///     .with_alpha_prior(ConcentrationPrior { shape: 2.0, rate: 1.0 })
///     .with_init(InitStrategy::Connected)
///     .with_seed(42);
///
/// assert!(config.validate().is_ok());
/// assert!(DpConfig::default().with_alpha(-1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct DpConfig {
    /// Initial concentration parameter
    pub alpha: f64,
    /// Prior on α. If `None`, α is held fixed.
    #[cfg_attr(feature = "serde1", serde(default))]
    pub alpha_prior: Option<ConcentrationPrior>,
    #[cfg_attr(feature = "serde1", serde(default))]
    pub init: InitStrategy,
    /// Sweeps between progress log lines. Zero turns them off.
    #[cfg_attr(feature = "serde1", serde(default = "default_log_every"))]
    pub log_every: usize,
    /// Seed of the chain's random stream. Drawn from entropy if `None`.
    #[cfg_attr(feature = "serde1", serde(default))]
    pub seed: Option<u64>,
}

#[cfg(feature = "serde1")]
fn default_log_every() -> usize {
    DEFAULT_LOG_EVERY
}

impl Default for DpConfig {
    fn default() -> Self {
        DpConfig {
            alpha: 1.0,
            alpha_prior: None,
            init: InitStrategy::default(),
            log_every: DEFAULT_LOG_EVERY,
            seed: None,
        }
    }
}

impl DpConfig {
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_alpha_prior(mut self, prior: ConcentrationPrior) -> Self {
        self.alpha_prior = Some(prior);
        self
    }

    #[must_use]
    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    #[must_use]
    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// A fresh random stream for the chain, seeded if `seed` is set
    pub fn rng(&self) -> Xoshiro256Plus {
        match self.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        }
    }

    /// The α sampler, if α is to be updated
    pub(crate) fn concentration_sampler(
        &self,
    ) -> Result<Option<GammaPriorConcentration>, ConfigError> {
        self.alpha_prior
            .map(GammaPriorConcentration::try_from)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(ConfigError::InvalidAlpha { alpha: self.alpha });
        }
        self.concentration_sampler().map(|_| ())
    }
}
