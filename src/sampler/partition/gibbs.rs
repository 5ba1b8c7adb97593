#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;
use std::iter;

use super::PartitionSampler;
use crate::data::Partition;
use crate::misc::ln_pflip;
use crate::traits::{ConjugatePrior, Density};

/// Collapsed Gibbs reassignment for conjugate models (Neal 2000,
/// algorithm 2).
///
/// Items are visited in index order. For each item the weights are
/// ln(size) + ln f(x|θ) for every existing cluster and ln(α) plus the prior
/// predictive for a new one.
///
/// A new cluster gets its value from the posterior given the item alone,
/// not from the base measure. This is deliberate: the item is already
/// conditioned on when the new cluster is chosen through the prior
/// predictive, so its value must be drawn from that same posterior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct MarginalGibbs;

impl<X, P, D, B> PartitionSampler<X, P, D, B> for MarginalGibbs
where
    D: Density<X, P>,
    B: ConjugatePrior<X, P>,
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
        let ln_alpha = alpha.ln();
        for (item, x) in data.iter().enumerate() {
            partition.take_item(item);
            partition.remove_empty_cells();

            let mut ln_weights: Vec<f64> = partition
                .cells()
                .iter()
                .map(|cell| {
                    (cell.len() as f64).ln() + density.ln_f(x, cell.value())
                })
                .collect();
            ln_weights.push(ln_alpha + base.ln_pp(x));

            let k = partition.n_cells();
            let zi = ln_pflip(&ln_weights, rng);
            let cell_ix = if zi == k {
                partition.add_cell(base.draw_posterior(iter::once(x), rng))
            } else {
                zi
            };
            partition.add_item(item, cell_ix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BinomialDatum;
    use crate::dist::{Beta, Binomial};
    use crate::sampler::{AtomSampler, ConjugateAtomSampler};
    use crate::test::{binomial_data, separates};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn keeps_every_item_exactly_once() {
        let mut rng = Xoshiro256Plus::seed_from_u64(61);
        let data: Vec<BinomialDatum> = (0..30)
            .map(|i| BinomialDatum::new(i % 21, 20))
            .collect();
        let mut part =
            Partition::from_labels(&[0; 30], vec![0.5]).unwrap();

        let mut sampler = MarginalGibbs;
        for _ in 0..20 {
            sampler.sample(
                &data,
                &mut part,
                1.0,
                &Binomial,
                &Beta::uniform(),
                &mut rng,
            );
            assert!(part.validate(30).is_ok());
            assert!(part.cells().iter().all(|cell| !cell.is_empty()));
        }
    }

    #[test]
    fn separates_well_separated_groups() {
        let mut rng = Xoshiro256Plus::seed_from_u64(62);
        let data = binomial_data(&[1, 2, 1, 0, 2, 19, 18, 20, 19, 18], 20);
        let mut part =
            Partition::from_labels(&[0; 10], vec![0.5]).unwrap();

        let mut sampler = MarginalGibbs;
        let mut atoms = ConjugateAtomSampler;
        let base = Beta::uniform();
        for _ in 0..50 {
            sampler.sample(&data, &mut part, 1.0, &Binomial, &base, &mut rng);
            atoms.sample(&data, &mut part, &Binomial, &base, &mut rng);
        }
        // no cluster mixes low and high counts
        assert!(separates(&part.labels(), &[0, 1, 2, 3, 4], &[5, 6, 7, 8, 9]));
    }

    #[test]
    fn new_cluster_value_comes_from_the_item_posterior() {
        let mut rng = Xoshiro256Plus::seed_from_u64(63);
        let data = vec![BinomialDatum::new(20, 20)];
        let mut part = Partition::from_labels(&[0], vec![0.5]).unwrap();

        // A lone item always lands in a fresh cluster, whose value is a
        // Beta(21, 1) draw with mean 21/22. A base measure draw would
        // average 1/2.
        let mut sampler = MarginalGibbs;
        let n = 2_000;
        let mut total = 0.0;
        for _ in 0..n {
            sampler.sample(&data, &mut part, 1.0, &Binomial, &Beta::uniform(), &mut rng);
            assert_eq!(part.n_cells(), 1);
            total += *part.value(0);
        }
        assert::close(total / f64::from(n), 21.0 / 22.0, 0.01);
    }
}
