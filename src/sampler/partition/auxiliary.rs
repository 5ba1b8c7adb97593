#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use rand::Rng;

use super::{shuffled_items, PartitionSampler, PartitionSamplerError};
use crate::consts::DEFAULT_N_AUX;
use crate::data::Partition;
use crate::misc::ln_pflip;
use crate::traits::{BaseMeasure, Density};

/// Gibbs reassignment with auxiliary parameters for non-conjugate models
/// (Neal 2000, algorithm 8).
///
/// Items are visited in a fresh random order every sweep. Before an item is
/// reassigned the pool of empty candidate clusters is topped up to `m` with
/// draws from the base measure; the cluster the item just left counts as
/// one of them if it emptied. Existing clusters are weighted by their size
/// and candidates by α/m. Unused candidates are dropped before the next
/// item.
///
/// # Example
///
/// ```rust
/// use dpmix::sampler::AuxiliaryGibbs;
///
/// assert_eq!(AuxiliaryGibbs::default().m(), 2);
/// assert!(AuxiliaryGibbs::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct AuxiliaryGibbs {
    m: usize,
}

impl AuxiliaryGibbs {
    /// Create a sampler with `m` auxiliary clusters
    pub fn new(m: usize) -> Result<Self, PartitionSamplerError> {
        if m == 0 {
            Err(PartitionSamplerError::NoAuxiliaryClusters)
        } else {
            Ok(AuxiliaryGibbs { m })
        }
    }

    /// The number of auxiliary clusters
    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }
}

impl Default for AuxiliaryGibbs {
    fn default() -> Self {
        AuxiliaryGibbs { m: DEFAULT_N_AUX }
    }
}

impl<X, P, D, B> PartitionSampler<X, P, D, B> for AuxiliaryGibbs
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
        partition.remove_empty_cells();
        let ln_alpha_m = (alpha / self.m as f64).ln();

        for item in shuffled_items(data.len(), rng) {
            let x = &data[item];
            let old_ix = partition.take_item(item);

            let n_new = if partition.cell(old_ix).is_empty() {
                self.m - 1
            } else {
                self.m
            };
            for _ in 0..n_new {
                partition.add_cell(base.draw(rng));
            }

            let ln_weights: Vec<f64> = partition
                .cells()
                .iter()
                .map(|cell| {
                    let ln_ct = if cell.is_empty() {
                        ln_alpha_m
                    } else {
                        (cell.len() as f64).ln()
                    };
                    ln_ct + density.ln_f(x, cell.value())
                })
                .collect();

            let cell_ix = ln_pflip(&ln_weights, rng);
            partition.add_item(item, cell_ix);
            partition.remove_empty_cells();
        }
    }
}
