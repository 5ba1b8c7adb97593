//! Reassignment of items to clusters given α and the cluster values
//!
//! Every kernel weights an existing cluster by its size times the
//! likelihood of the item, and a new cluster by α times the likelihood
//! under a fresh value (or the prior predictive). Weights are normalized in
//! log space.
use rand::Rng;
use thiserror::Error;

use crate::data::Partition;

mod auxiliary;
mod gibbs;
mod metropolis;
mod split_merge;

pub use auxiliary::AuxiliaryGibbs;
pub use gibbs::MarginalGibbs;
pub use metropolis::MetropolisGibbs;
pub use split_merge::{MoveKind, SplitMerge, SplitMergeGibbs, SplitMergeMove};

/// Resamples the assignment of items to cells.
///
/// On return every item belongs to exactly one non-empty cell.
pub trait PartitionSampler<X, P, D, B> {
    fn sample<R: Rng>(
        &mut self,
        data: &[X],
        partition: &mut Partition<P>,
        alpha: f64,
        density: &D,
        base: &B,
        rng: &mut R,
    );
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionSamplerError {
    /// The auxiliary sampler needs at least one empty candidate cluster
    #[error("the number of auxiliary clusters must be at least one")]
    NoAuxiliaryClusters,
    /// A mixing probability outside [0, 1]
    #[error("split-merge probability must be in [0, 1], got {rho}")]
    RhoOutOfRange { rho: f64 },
}

/// A fresh uniformly random visiting order of `n` items
fn shuffled_items<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    use rand::seq::SliceRandom;

    let mut items: Vec<usize> = (0..n).collect();
    items.shuffle(rng);
    items
}
