#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;

use super::{shuffled_items, PartitionSampler};
use crate::data::Partition;
use crate::misc::rvs::draw_uniform;
use crate::misc::{ln_pflip, pflip};
use crate::traits::{BaseMeasure, Density};

/// Metropolis-within-Gibbs reassignment for non-conjugate models (Neal
/// 2000, algorithm 7).
///
/// A sweep has two phases, each visiting the items in a fresh random order.
///
/// 1. An item alone in its cluster proposes joining an existing cluster
///    picked in proportion to its size. Any other item proposes opening a
///    new singleton cluster with a value drawn from the base measure. Both
///    are accepted with the Metropolis ratio of the item's likelihoods
///    corrected by ln(n - 1) - ln(α) or its negation.
/// 2. Items not in singleton clusters are reassigned among the existing
///    clusters only, weighted by size times likelihood.
///
/// Phase 2 skips singletons outright rather than conditioning on them,
/// which differs from the published algorithm. The behaviour is kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct MetropolisGibbs;

impl MetropolisGibbs {
    fn propose_moves<X, P, D, B, R>(
        data: &[X],
        partition: &mut Partition<P>,
        alpha: f64,
        density: &D,
        base: &B,
        rng: &mut R,
    ) where
        D: Density<X, P>,
        B: BaseMeasure<P>,
        R: Rng,
    {
        let ln_n_alpha = ((data.len() - 1) as f64).ln() - alpha.ln();

        for item in shuffled_items(data.len(), rng) {
            let x = &data[item];
            let old_ix = partition.take_item(item);
            let old_ll = density.ln_f(x, partition.value(old_ix));

            if partition.cell(old_ix).is_empty() {
                // Every other item is somewhere, so the counts sum to n - 1
                let weights: Vec<f64> =
                    partition.counts().iter().map(|&ct| ct as f64).collect();
                let new_ix = pflip(&weights, rng);
                let new_ll = density.ln_f(x, partition.value(new_ix));

                let ln_ratio = ln_n_alpha + new_ll - old_ll;
                if ln_ratio >= draw_uniform(rng).ln() {
                    partition.add_item(item, new_ix);
                } else {
                    partition.add_item(item, old_ix);
                }
            } else {
                let value = base.draw(rng);
                let new_ll = density.ln_f(x, &value);

                let ln_ratio = new_ll - old_ll - ln_n_alpha;
                if ln_ratio >= draw_uniform(rng).ln() {
                    let new_ix = partition.add_cell(value);
                    partition.add_item(item, new_ix);
                } else {
                    partition.add_item(item, old_ix);
                }
            }
        }
        partition.remove_empty_cells();
    }

    fn reassign_shared<X, P, D, R>(
        data: &[X],
        partition: &mut Partition<P>,
        density: &D,
        rng: &mut R,
    ) where
        D: Density<X, P>,
        R: Rng,
    {
        for item in shuffled_items(data.len(), rng) {
            let Some(old_ix) = partition.cell_of(item) else {
                continue;
            };
            if partition.cell(old_ix).len() == 1 {
                continue;
            }
            let x = &data[item];
            partition.remove_item(item, old_ix);

            let ln_weights: Vec<f64> = partition
                .cells()
                .iter()
                .map(|cell| {
                    (cell.len() as f64).ln() + density.ln_f(x, cell.value())
                })
                .collect();

            let new_ix = ln_pflip(&ln_weights, rng);
            partition.add_item(item, new_ix);
        }
        partition.remove_empty_cells();
    }
}

impl<X, P, D, B> PartitionSampler<X, P, D, B> for MetropolisGibbs
where
    D: Density<X, P>,
    B: BaseMeasure<P>,
{
    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &mut Partition<P>,
        alpha: f64,
        density: &D,
        base: &B,
        rng: &mut R,
    ) {
        if data.len() < 2 {
            return;
        }
        partition.remove_empty_cells();
        Self::propose_moves(data, partition, alpha, density, base, rng);
        Self::reassign_shared(data, partition, density, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BinomialDatum;
    use crate::dist::{Beta, BetaProposal, Binomial, Gamma, Poisson};
    use crate::sampler::{AtomSampler, MetropolisAtomSampler};
    use crate::test::{binomial_data, separates};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn keeps_every_item_exactly_once() {
        let mut rng = Xoshiro256Plus::seed_from_u64(81);
        let data: Vec<u32> = (0..25).map(|i| (i * 3) % 11).collect();
        let labels: Vec<usize> = (0..25).collect();
        let values: Vec<f64> = data.iter().map(|&x| f64::from(x) + 0.5).collect();
        let mut part = Partition::from_labels(&labels, values).unwrap();
        let base = Gamma::new(1.0, 0.2).unwrap();

        let mut sampler = MetropolisGibbs;
        for _ in 0..20 {
            sampler.sample(&data, &mut part, 1.0, &Poisson, &base, &mut rng);
            assert!(part.validate(25).is_ok());
            assert!(part.cells().iter().all(|cell| !cell.is_empty()));
        }
    }

    #[test]
    fn single_item_is_left_alone() {
        let mut rng = Xoshiro256Plus::seed_from_u64(82);
        let data = vec![BinomialDatum::new(3, 10)];
        let mut part = Partition::from_labels(&[0], vec![0.3]).unwrap();
        let mut sampler = MetropolisGibbs;
        sampler.sample(&data, &mut part, 1.0, &Binomial, &Beta::uniform(), &mut rng);
        assert_eq!(part.n_cells(), 1);
        assert_eq!(*part.value(0), 0.3);
    }

    #[test]
    fn separates_well_separated_groups() {
        let mut rng = Xoshiro256Plus::seed_from_u64(83);
        let data = binomial_data(&[1, 2, 1, 0, 2, 19, 18, 20, 19, 18], 20);
        let mut part = Partition::from_labels(&[0; 10], vec![0.5]).unwrap();
        let base = Beta::uniform();

        let mut sampler = MetropolisGibbs;
        let mut atoms = MetropolisAtomSampler::new(BetaProposal::new(10.0).unwrap());
        for _ in 0..300 {
            sampler.sample(&data, &mut part, 1.0, &Binomial, &base, &mut rng);
            atoms.sample(&data, &mut part, &Binomial, &base, &mut rng);
        }
        assert!(separates(&part.labels(), &[0, 1, 2, 3, 4], &[5, 6, 7, 8, 9]));
    }
}
