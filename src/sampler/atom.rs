//! Updates of the cluster parameter values given the partition
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;

use crate::data::Partition;
use crate::misc::rvs::draw_uniform;
use crate::traits::{BaseMeasure, ConjugatePrior, Density, Proposal};

/// Resamples the value of every cell, leaving the assignment of items to
/// cells untouched.
pub trait AtomSampler<X, P, D, B> {
    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &mut Partition<P>,
        density: &D,
        base: &B,
        rng: &mut R,
    );
}

/// Draws each cell value from its closed-form posterior given the cell's
/// items. Requires a conjugate base measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ConjugateAtomSampler;

impl<X, P, D, B> AtomSampler<X, P, D, B> for ConjugateAtomSampler
where
    B: ConjugatePrior<X, P>,
{
    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &mut Partition<P>,
        _density: &D,
        base: &B,
        rng: &mut R,
    ) {
        for ix in 0..partition.n_cells() {
            let value = {
                let items = partition.cell(ix).items();
                base.draw_posterior(items.iter().map(|&item| &data[item]), rng)
            };
            partition.set_value(ix, value);
        }
    }
}

/// One Metropolis-Hastings step per cell with a user supplied proposal.
///
/// The cells are conditionally independent given the partition, so each is
/// accepted or rejected on its own. The log acceptance ratio is
///
/// ```math
/// [ln G₀(θ') + Σ ln f(x|θ') - ln q(θ'|θ)] - [ln G₀(θ) + Σ ln f(x|θ) - ln q(θ|θ')]
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct MetropolisAtomSampler<Q> {
    proposal: Q,
    n_proposed: usize,
    n_accepted: usize,
}

impl<Q> MetropolisAtomSampler<Q> {
    pub fn new(proposal: Q) -> Self {
        MetropolisAtomSampler {
            proposal,
            n_proposed: 0,
            n_accepted: 0,
        }
    }

    pub fn proposal(&self) -> &Q {
        &self.proposal
    }

    /// Fraction of proposals accepted so far, `None` before the first
    pub fn acceptance_rate(&self) -> Option<f64> {
        (self.n_proposed > 0)
            .then(|| self.n_accepted as f64 / self.n_proposed as f64)
    }
}

impl<X, P, D, B, Q> AtomSampler<X, P, D, B> for MetropolisAtomSampler<Q>
where
    D: Density<X, P>,
    B: BaseMeasure<P>,
    Q: Proposal<P>,
{
    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &mut Partition<P>,
        density: &D,
        base: &B,
        rng: &mut R,
    ) {
        for ix in 0..partition.n_cells() {
            let cell = partition.cell(ix);
            let old = cell.value();
            let new = self.proposal.draw(old, rng);

            let old_ll = base.ln_f(old)
                + density.ln_f_items(data, cell.items(), old);
            let new_ll = base.ln_f(&new)
                + density.ln_f_items(data, cell.items(), &new);

            let forward = new_ll - self.proposal.ln_f(&new, old);
            let reverse = old_ll - self.proposal.ln_f(old, &new);

            self.n_proposed += 1;
            if forward - reverse >= draw_uniform(rng).ln() {
                self.n_accepted += 1;
                partition.set_value(ix, new);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BinomialDatum;
    use crate::dist::{Beta, BetaProposal, Binomial, PriorProposal};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn setup() -> (Vec<BinomialDatum>, Partition<f64>) {
        let data: Vec<BinomialDatum> = [1, 2, 1, 18, 19, 17]
            .iter()
            .map(|&x| BinomialDatum::new(x, 20))
            .collect();
        let part =
            Partition::from_labels(&[0, 0, 0, 1, 1, 1], vec![0.5, 0.5]).unwrap();
        (data, part)
    }

    #[test]
    fn conjugate_moves_values_toward_data() {
        let mut rng = Xoshiro256Plus::seed_from_u64(51);
        let (data, mut part) = setup();
        let labels = part.labels();

        let mut sampler = ConjugateAtomSampler;
        sampler.sample(&data, &mut part, &Binomial, &Beta::uniform(), &mut rng);

        assert_eq!(part.labels(), labels);
        assert!(*part.value(0) < 0.25);
        assert!(*part.value(1) > 0.75);
    }

    #[test]
    fn metropolis_matches_conjugate_posterior_mean() {
        let mut rng = Xoshiro256Plus::seed_from_u64(52);
        let (data, mut part) = setup();
        let base = Beta::uniform();
        let mut sampler = MetropolisAtomSampler::new(BetaProposal::new(20.0).unwrap());

        let n = 20_000;
        let mut total = 0.0;
        for _ in 0..n {
            sampler.sample(&data, &mut part, &Binomial, &base, &mut rng);
            total += *part.value(0);
        }
        // Beta(1 + 4, 1 + 56)
        assert::close(total / f64::from(n), 5.0 / 62.0, 0.005);

        let rate = sampler.acceptance_rate().unwrap();
        assert!(rate > 0.0 && rate < 1.0);
    }

    #[test]
    fn prior_proposal_with_prior_equal_to_base() {
        let mut rng = Xoshiro256Plus::seed_from_u64(53);
        let (data, mut part) = setup();
        let base = Beta::uniform();
        let mut sampler = MetropolisAtomSampler::new(PriorProposal::new(base.clone()));
        assert_eq!(sampler.acceptance_rate(), None);

        for _ in 0..200 {
            sampler.sample(&data, &mut part, &Binomial, &base, &mut rng);
        }
        assert!(*part.value(1) > 0.7);
    }
}
