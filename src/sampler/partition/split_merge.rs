#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::LN_2;

use super::{AuxiliaryGibbs, PartitionSampler, PartitionSamplerError};
use crate::data::Partition;
use crate::misc::rvs::draw_uniform;
use crate::misc::{ln_crp, logaddexp};
use crate::traits::{BaseMeasure, Density, Proposal};

/// Whether a split-merge proposal splits one cluster or merges two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum MoveKind {
    Split,
    Merge,
}

/// A proposed partition and its log Metropolis-Hastings acceptance ratio
#[derive(Debug, Clone)]
pub struct SplitMergeMove<P> {
    /// The partition after the move
    pub candidate: Partition<P>,
    /// Log acceptance ratio of moving to `candidate`
    pub ln_ratio: f64,
    pub kind: MoveKind,
}

/// Sequential-allocation split-merge for non-conjugate models (Dahl 2003;
/// Jain & Neal 2004).
///
/// Two distinct anchor items `i` and `j` are chosen uniformly. If they
/// share a cluster, the cluster is split: `i` keeps the current value, `j`
/// opens a new cluster whose value is drawn from `proposal` given `i`'s,
/// and the remaining members are allocated one at a time, in random order,
/// in proportion to sub-cluster size times likelihood. If they are in
/// different clusters, `j`'s cluster is merged into `i`'s and its value
/// dropped; the reverse split is scored by replaying the allocation against
/// the known assignment.
///
/// Only the two affected clusters change, so a move is cheap, but it mixes
/// slowly over the cluster values. See [`SplitMergeGibbs`] for the usual
/// pairing with a local sampler.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct SplitMerge<Q> {
    proposal: Q,
}

/// Sub-cluster choices, `true` for `j`'s side, and their log probability
struct Allocation {
    to_j: Vec<bool>,
    ln_q: f64,
}

fn allocate<X, P, D, R>(
    data: &[X],
    items: &[usize],
    (value_i, value_j): (&P, &P),
    density: &D,
    known: Option<&[bool]>,
    rng: &mut R,
) -> Allocation
where
    D: Density<X, P>,
    R: Rng,
{
    let mut n_i: f64 = 1.0;
    let mut n_j: f64 = 1.0;
    let mut ln_q = 0.0;
    let mut to_j = Vec::with_capacity(items.len());

    for (k, &item) in items.iter().enumerate() {
        let x = &data[item];
        let lw_i = n_i.ln() + density.ln_f(x, value_i);
        let lw_j = n_j.ln() + density.ln_f(x, value_j);
        let z = logaddexp(lw_i, lw_j);
        let (ln_pi, ln_pj) = if z == f64::NEG_INFINITY {
            (-LN_2, -LN_2)
        } else {
            (lw_i - z, lw_j - z)
        };

        let joins_j = match known {
            Some(known) => known[k],
            None => draw_uniform(rng).ln() < ln_pj,
        };
        if joins_j {
            n_j += 1.0;
            ln_q += ln_pj;
        } else {
            n_i += 1.0;
            ln_q += ln_pi;
        }
        to_j.push(joins_j);
    }
    Allocation { to_j, ln_q }
}

fn owner_of<P>(partition: &Partition<P>, item: usize) -> usize {
    partition
        .cell_of(item)
        .unwrap_or_else(|| panic!("item {item} is not assigned"))
}

impl<Q> SplitMerge<Q> {
    /// Create a split-merge kernel drawing new cluster values from
    /// `proposal`
    pub fn new(proposal: Q) -> Self {
        SplitMerge { proposal }
    }

    pub fn proposal(&self) -> &Q {
        &self.proposal
    }

    /// Build the split or merge move anchored on items `i` and `j`.
    ///
    /// The current partition is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `i == j` or either item is unassigned.
    #[allow(clippy::too_many_arguments)]
    pub fn propose<X, P, D, B, R>(
        &self,
        data: &[X],
        partition: &Partition<P>,
        i: usize,
        j: usize,
        alpha: f64,
        density: &D,
        base: &B,
        rng: &mut R,
    ) -> SplitMergeMove<P>
    where
        D: Density<X, P>,
        B: BaseMeasure<P>,
        Q: Proposal<P>,
        R: Rng,
    {
        assert_ne!(i, j, "split-merge anchors must be distinct");
        let ci = owner_of(partition, i);
        let cj = owner_of(partition, j);
        if ci == cj {
            self.propose_split(data, partition, (i, j), ci, alpha, density, base, rng)
        } else {
            self.propose_merge(
                data,
                partition,
                (i, j),
                (ci, cj),
                alpha,
                density,
                base,
                rng,
            )
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn propose_split<X, P, D, B, R>(
        &self,
        data: &[X],
        partition: &Partition<P>,
        (i, j): (usize, usize),
        ci: usize,
        alpha: f64,
        density: &D,
        base: &B,
        rng: &mut R,
    ) -> SplitMergeMove<P>
    where
        D: Density<X, P>,
        B: BaseMeasure<P>,
        Q: Proposal<P>,
        R: Rng,
    {
        let cell = partition.cell(ci);
        let value_i = cell.value_arc();
        let mut members: Vec<usize> = cell
            .items()
            .iter()
            .copied()
            .filter(|&k| k != i && k != j)
            .collect();
        members.shuffle(rng);

        let value_j = self.proposal.draw(&value_i, rng);
        let alloc = allocate(
            data,
            &members,
            (&*value_i, &value_j),
            density,
            None,
            rng,
        );
        let ln_q_fwd = alloc.ln_q + self.proposal.ln_f(&value_j, &value_i);
        let ln_prior_j = base.ln_f(&value_j);

        let mut candidate = partition.clone();
        let cj = candidate.add_cell(value_j);
        candidate.remove_item(j, ci);
        candidate.add_item(j, cj);
        members
            .iter()
            .zip(alloc.to_j.iter())
            .filter(|&(_, &to_j)| to_j)
            .for_each(|(&item, _)| {
                candidate.remove_item(item, ci);
                candidate.add_item(item, cj);
            });

        let ll_cur = density.ln_f_items(data, cell.items(), &value_i);
        let ll_new = density.ln_f_items(data, candidate.cell(ci).items(), &value_i)
            + density.ln_f_items(
                data,
                candidate.cell(cj).items(),
                candidate.value(cj),
            );
        let ln_crp_delta =
            ln_crp(&candidate.counts(), alpha) - ln_crp(&partition.counts(), alpha);

        SplitMergeMove {
            candidate,
            ln_ratio: ll_new - ll_cur + ln_crp_delta + ln_prior_j - ln_q_fwd,
            kind: MoveKind::Split,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn propose_merge<X, P, D, B, R>(
        &self,
        data: &[X],
        partition: &Partition<P>,
        (i, j): (usize, usize),
        (ci, cj): (usize, usize),
        alpha: f64,
        density: &D,
        base: &B,
        rng: &mut R,
    ) -> SplitMergeMove<P>
    where
        D: Density<X, P>,
        B: BaseMeasure<P>,
        Q: Proposal<P>,
        R: Rng,
    {
        let cell_i = partition.cell(ci);
        let cell_j = partition.cell(cj);
        let value_i = cell_i.value_arc();
        let value_j = cell_j.value_arc();

        let mut members: Vec<usize> = cell_i
            .items()
            .iter()
            .chain(cell_j.items().iter())
            .copied()
            .filter(|&k| k != i && k != j)
            .collect();
        members.shuffle(rng);
        let known: Vec<bool> = members
            .iter()
            .map(|&item| partition.cell_of(item) == Some(cj))
            .collect();

        // Probability that the reverse split lands exactly here
        let alloc = allocate(
            data,
            &members,
            (&*value_i, &*value_j),
            density,
            Some(&known),
            rng,
        );
        let ln_q_rev = alloc.ln_q + self.proposal.ln_f(&value_j, &value_i);

        let mut candidate = partition.clone();
        cell_j.items().iter().for_each(|&item| {
            candidate.remove_item(item, cj);
            candidate.add_item(item, ci);
        });
        candidate.remove_cell(cj);
        let merged = if cj < ci { ci - 1 } else { ci };

        let ll_cur = density.ln_f_items(data, cell_i.items(), &value_i)
            + density.ln_f_items(data, cell_j.items(), &value_j);
        let ll_new =
            density.ln_f_items(data, candidate.cell(merged).items(), &value_i);
        let ln_crp_delta =
            ln_crp(&candidate.counts(), alpha) - ln_crp(&partition.counts(), alpha);

        SplitMergeMove {
            candidate,
            ln_ratio: ll_new - ll_cur + ln_crp_delta - base.ln_f(&value_j)
                + ln_q_rev,
            kind: MoveKind::Merge,
        }
    }
}

impl<X, P, D, B, Q> PartitionSampler<X, P, D, B> for SplitMerge<Q>
where
    D: Density<X, P>,
    B: BaseMeasure<P>,
    Q: Proposal<P>,
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
        let n = data.len();
        if n < 2 {
            return;
        }
        partition.remove_empty_cells();

        let i = rng.gen_range(0..n);
        let j = {
            let j = rng.gen_range(0..n - 1);
            if j >= i {
                j + 1
            } else {
                j
            }
        };

        let mv = self.propose(data, partition, i, j, alpha, density, base, rng);
        if mv.ln_ratio >= draw_uniform(rng).ln() {
            debug!(
                "accepted {:?} anchored on items {i} and {j}: {} -> {} clusters",
                mv.kind,
                partition.n_cells(),
                mv.candidate.n_cells()
            );
            *partition = mv.candidate;
        }
    }
}

/// With probability `rho` a [`SplitMerge`] move, otherwise an
/// [`AuxiliaryGibbs`] sweep.
///
/// # Example
///
/// ```rust
/// use dpmix::dist::{Beta, PriorProposal};
/// use dpmix::sampler::{AuxiliaryGibbs, SplitMerge, SplitMergeGibbs};
///
/// let split_merge = SplitMerge::new(PriorProposal::new(Beta::uniform()));
/// let kernel = SplitMergeGibbs::new(split_merge.clone(), AuxiliaryGibbs::default(), 0.3);
/// assert!(kernel.is_ok());
///
/// let kernel = SplitMergeGibbs::new(split_merge, AuxiliaryGibbs::default(), 1.5);
/// assert!(kernel.is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct SplitMergeGibbs<Q> {
    split_merge: SplitMerge<Q>,
    gibbs: AuxiliaryGibbs,
    rho: f64,
}

impl<Q> SplitMergeGibbs<Q> {
    pub fn new(
        split_merge: SplitMerge<Q>,
        gibbs: AuxiliaryGibbs,
        rho: f64,
    ) -> Result<Self, PartitionSamplerError> {
        if (0.0..=1.0).contains(&rho) {
            Ok(SplitMergeGibbs {
                split_merge,
                gibbs,
                rho,
            })
        } else {
            Err(PartitionSamplerError::RhoOutOfRange { rho })
        }
    }

    /// Probability of a split-merge move
    pub fn rho(&self) -> f64 {
        self.rho
    }
}

impl<X, P, D, B, Q> PartitionSampler<X, P, D, B> for SplitMergeGibbs<Q>
where
    D: Density<X, P>,
    B: BaseMeasure<P>,
    Q: Proposal<P>,
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
        if draw_uniform(rng) < self.rho {
            self.split_merge
                .sample(data, partition, alpha, density, base, rng);
        } else {
            self.gibbs.sample(data, partition, alpha, density, base, rng);
        }
    }
}
