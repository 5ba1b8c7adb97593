//! Updates of hyperparameters shared by every cluster's likelihood
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use log::debug;
use rand::Rng;

use crate::data::Partition;
use crate::misc::rvs::draw_uniform;
use crate::traits::{BaseMeasure, Density, GlobalParameterized, Proposal};

/// Resamples the global parameters of a density given the data and the
/// current partition.
///
/// The sampler reads and writes the parameters through the density it
/// updates, so it also owns how they are recorded in and restored from a
/// trace.
pub trait GlobalParameterSampler<X, P, D> {
    /// The recorded form of the global parameters
    type Global: Clone;

    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &Partition<P>,
        density: &mut D,
        rng: &mut R,
    );

    /// The current global parameters, `None` if there are none to record
    fn snapshot(&self, density: &D) -> Option<Self::Global>;

    /// Put back recorded global parameters
    fn restore(&mut self, density: &mut D, global: Self::Global);
}

/// The density has no global parameters, or they are held fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct NoGlobalUpdate;

impl<X, P, D> GlobalParameterSampler<X, P, D> for NoGlobalUpdate {
    type Global = ();

    fn sample<R: Rng>(
        &mut self,
        _data: &[X],
        _partition: &Partition<P>,
        _density: &mut D,
        _rng: &mut R,
    ) {
    }

    fn snapshot(&self, _density: &D) -> Option<()> {
        None
    }

    fn restore(&mut self, _density: &mut D, _global: ()) {}
}

/// One Metropolis-Hastings step on the global parameters per call.
///
/// The log acceptance ratio combines the prior on the global parameters,
/// the log likelihood of every datum under its cluster's value, and the
/// (possibly asymmetric) proposal. On rejection the previous value is put
/// back.
///
/// # Example
///
/// ```rust
/// use dpmix::data::{BinomialDatum, Partition};
/// use dpmix::dist::{BetaBinomial, Gamma, GammaProposal};
/// use dpmix::sampler::{GlobalParameterSampler, MetropolisGlobalSampler};
/// use dpmix::traits::GlobalParameterized;
/// use rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256Plus;
///
/// let mut rng = Xoshiro256Plus::seed_from_u64(3);
/// let data: Vec<BinomialDatum> =
///     [3, 12, 7, 18, 1].iter().map(|&x| BinomialDatum::new(x, 20)).collect();
/// let partition = Partition::from_labels(&[0; 5], vec![0.5]).unwrap();
///
/// let mut density = BetaBinomial::new(100.0).unwrap();
/// let mut sampler = MetropolisGlobalSampler::new(
///     Gamma::new(1.0, 0.01).unwrap(),
///     GammaProposal::new(10.0).unwrap(),
/// );
/// for _ in 0..500 {
///     sampler.sample(&data, &partition, &mut density, &mut rng);
/// }
/// // the data are far more dispersed than a binomial
/// assert!(density.global() < 100.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct MetropolisGlobalSampler<Pr, Q> {
    prior: Pr,
    proposal: Q,
}

impl<Pr, Q> MetropolisGlobalSampler<Pr, Q> {
    pub fn new(prior: Pr, proposal: Q) -> Self {
        MetropolisGlobalSampler { prior, proposal }
    }

    pub fn prior(&self) -> &Pr {
        &self.prior
    }

    pub fn proposal(&self) -> &Q {
        &self.proposal
    }
}

fn ln_f_all<X, P, D: Density<X, P>>(
    data: &[X],
    partition: &Partition<P>,
    density: &D,
) -> f64 {
    partition
        .cells()
        .iter()
        .map(|cell| density.ln_f_items(data, cell.items(), cell.value()))
        .sum()
}

impl<X, P, D, Pr, Q> GlobalParameterSampler<X, P, D>
    for MetropolisGlobalSampler<Pr, Q>
where
    D: Density<X, P> + GlobalParameterized,
    Pr: BaseMeasure<D::Global>,
    Q: Proposal<D::Global>,
{
    type Global = D::Global;

    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &Partition<P>,
        density: &mut D,
        rng: &mut R,
    ) {
        let old = density.global();
        let new = self.proposal.draw(&old, rng);

        let old_ll = self.prior.ln_f(&old) + ln_f_all(data, partition, density);
        let new_prior = self.prior.ln_f(&new);
        if new_prior == f64::NEG_INFINITY {
            return;
        }

        density.set_global(new.clone());
        let new_ll = new_prior + ln_f_all(data, partition, density);

        let forward = new_ll - self.proposal.ln_f(&new, &old);
        let reverse = old_ll - self.proposal.ln_f(&old, &new);

        if forward - reverse >= draw_uniform(rng).ln() {
            debug!("accepted global parameter proposal");
        } else {
            density.set_global(old);
        }
    }

    fn snapshot(&self, density: &D) -> Option<D::Global> {
        Some(density.global())
    }

    fn restore(&mut self, density: &mut D, global: D::Global) {
        density.set_global(global);
    }
}
