//! The chain driver
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use log::{info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::marker::PhantomData;

use super::atom::AtomSampler;
use super::concentration::GammaPriorConcentration;
use super::config::{DpConfig, InitStrategy};
use super::global::{GlobalParameterSampler, NoGlobalUpdate};
use super::partition::PartitionSampler;
use crate::data::Partition;
use crate::result::{DpError, Result};
use crate::trace::{Snapshot, Trace};
use crate::traits::{BaseMeasure, Density};

/// Where a chain is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum ChainState {
    /// No partition yet
    Uninitialized,
    /// Initialized, possibly mid-run
    Running,
    /// The last call to `run` finished
    Done,
}

/// Posterior sampler for a Dirichlet process mixture.
///
/// Owns the chain state (α, the partition and, through the density, any
/// global parameters) and the transition kernels. A sweep updates, in
/// order:
///
/// 1. α, if the config has a prior on it, given the previous partition,
/// 2. the partition, given α and the cluster values,
/// 3. the cluster values, given the new partition,
/// 4. the global parameters, if a global sampler is attached.
///
/// Every random draw comes from the single stream passed in, so a chain is
/// reproducible from its seed.
///
/// # Example
///
/// Non-conjugate sampling of Poisson counts with a Metropolis update of the
/// rates.
///
/// ```rust
/// use dpmix::dist::{Gamma, GammaProposal, Poisson};
/// use dpmix::sampler::{
///     ChainState, DirichletProcessSampler, DpConfig, MetropolisAtomSampler,
///     MetropolisGibbs,
/// };
/// use dpmix::trace::MemoryTrace;
///
/// let data: Vec<u32> = vec![0, 1, 0, 2, 30, 28, 33, 31];
/// let config = DpConfig::default().with_seed(0xABCD);
/// let mut rng = config.rng();
///
/// let mut sampler = DirichletProcessSampler::new(
///     Poisson,
///     Gamma::new(1.0, 0.05).unwrap(),
///     MetropolisGibbs,
///     MetropolisAtomSampler::new(GammaProposal::new(2.0).unwrap()),
///     config,
/// )
/// .unwrap();
///
/// let mut trace = MemoryTrace::new();
/// sampler.run(&data, &mut trace, 50, &mut rng).unwrap();
///
/// assert_eq!(sampler.state(), ChainState::Done);
/// assert_eq!(sampler.n_sweeps(), 50);
/// assert_eq!(trace.snapshots()[49].labels.len(), 8);
/// ```
pub struct DirichletProcessSampler<X, P, D, B, Ps, As, G = NoGlobalUpdate> {
    density: D,
    base: B,
    partition_sampler: Ps,
    atom_sampler: As,
    global_sampler: G,
    concentration: Option<GammaPriorConcentration>,
    config: DpConfig,
    alpha: f64,
    partition: Partition<P>,
    state: ChainState,
    n_sweeps: usize,
    _phantom: PhantomData<fn(&X)>,
}

impl<X, P, D, B, Ps, As> DirichletProcessSampler<X, P, D, B, Ps, As>
where
    D: Density<X, P>,
    B: BaseMeasure<P>,
{
    /// Create a sampler with no global parameter updates.
    ///
    /// Fails if the config is invalid.
    pub fn new(
        density: D,
        base: B,
        partition_sampler: Ps,
        atom_sampler: As,
        config: DpConfig,
    ) -> Result<Self> {
        config.validate()?;
        let concentration = config.concentration_sampler()?;
        Ok(DirichletProcessSampler {
            density,
            base,
            partition_sampler,
            atom_sampler,
            global_sampler: NoGlobalUpdate,
            concentration,
            alpha: config.alpha,
            config,
            partition: Partition::new(),
            state: ChainState::Uninitialized,
            n_sweeps: 0,
            _phantom: PhantomData,
        })
    }
}

impl<X, P, D, B, Ps, As, G> DirichletProcessSampler<X, P, D, B, Ps, As, G> {
    /// Replace the global parameter sampler
    pub fn with_global_sampler<G2>(
        self,
        global_sampler: G2,
    ) -> DirichletProcessSampler<X, P, D, B, Ps, As, G2> {
        DirichletProcessSampler {
            density: self.density,
            base: self.base,
            partition_sampler: self.partition_sampler,
            atom_sampler: self.atom_sampler,
            global_sampler,
            concentration: self.concentration,
            config: self.config,
            alpha: self.alpha,
            partition: self.partition,
            state: self.state,
            n_sweeps: self.n_sweeps,
            _phantom: PhantomData,
        }
    }

    /// Current concentration parameter
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn partition(&self) -> &Partition<P> {
        &self.partition
    }

    pub fn density(&self) -> &D {
        &self.density
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn partition_sampler(&self) -> &Ps {
        &self.partition_sampler
    }

    pub fn atom_sampler(&self) -> &As {
        &self.atom_sampler
    }

    pub fn global_sampler(&self) -> &G {
        &self.global_sampler
    }

    pub fn config(&self) -> &DpConfig {
        &self.config
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Number of sweeps completed over the life of the chain
    pub fn n_sweeps(&self) -> usize {
        self.n_sweeps
    }
}

impl<X, P, D, B, Ps, As, G> DirichletProcessSampler<X, P, D, B, Ps, As, G>
where
    D: Density<X, P>,
    B: BaseMeasure<P>,
    Ps: PartitionSampler<X, P, D, B>,
    As: AtomSampler<X, P, D, B>,
    G: GlobalParameterSampler<X, P, D>,
{
    /// Build the starting partition, with cluster values drawn from the
    /// base measure
    pub fn initialise<R: Rng>(
        &mut self,
        data: &[X],
        strategy: InitStrategy,
        rng: &mut R,
    ) -> Result<()> {
        if data.is_empty() {
            return Err(DpError::EmptyData);
        }
        let mut partition = Partition::new();
        match strategy {
            InitStrategy::Disconnected => (0..data.len()).for_each(|item| {
                let ix = partition.add_cell(self.base.draw(rng));
                partition.add_item(item, ix);
            }),
            InitStrategy::Connected => {
                let ix = partition.add_cell(self.base.draw(rng));
                (0..data.len()).for_each(|item| partition.add_item(item, ix));
            }
        }
        self.partition = partition;
        self.state = ChainState::Running;
        Ok(())
    }

    /// One sweep of every update. Initialises the chain first if needed.
    pub fn sweep<R: Rng>(&mut self, data: &[X], rng: &mut R) -> Result<()> {
        if self.state == ChainState::Uninitialized {
            self.initialise(data, self.config.init, rng)?;
        }
        if data.is_empty() {
            return Err(DpError::EmptyData);
        }
        if self.partition.n_items() != data.len() {
            return Err(DpError::PartitionSizeMismatch {
                n_items: self.partition.n_items(),
                n_data: data.len(),
            });
        }
        self.state = ChainState::Running;

        if let Some(concentration) = &self.concentration {
            self.alpha = concentration.sample(
                self.alpha,
                self.partition.n_cells(),
                self.partition.n_items(),
                rng,
            );
        }

        self.partition_sampler.sample(
            data,
            &mut self.partition,
            self.alpha,
            &self.density,
            &self.base,
            rng,
        );
        self.atom_sampler.sample(
            data,
            &mut self.partition,
            &self.density,
            &self.base,
            rng,
        );
        self.global_sampler.sample(
            data,
            &self.partition,
            &mut self.density,
            rng,
        );

        self.n_sweeps += 1;
        if self.config.log_every > 0 && self.n_sweeps % self.config.log_every == 0
        {
            info!(
                "sweep {}: {} clusters, alpha = {:.4}",
                self.n_sweeps,
                self.partition.n_cells(),
                self.alpha
            );
        }
        Ok(())
    }

    /// Run `n_sweeps` sweeps, pushing a snapshot to `trace` after each.
    ///
    /// If the trace rejects a snapshot the run stops and the error is
    /// returned. The chain is left in the state of the last completed sweep
    /// and can be resumed.
    pub fn run<T, R>(
        &mut self,
        data: &[X],
        trace: &mut T,
        n_sweeps: usize,
        rng: &mut R,
    ) -> Result<()>
    where
        P: Clone,
        T: Trace<P, G::Global>,
        R: Rng,
    {
        for _ in 0..n_sweeps {
            self.sweep(data, rng)?;
            if let Err(err) = trace.update(self.snapshot()) {
                warn!("trace rejected the snapshot of sweep {}: {err}", self.n_sweeps);
                return Err(err.into());
            }
        }
        self.state = ChainState::Done;
        Ok(())
    }

    /// The current state of the chain
    pub fn snapshot(&self) -> Snapshot<P, G::Global>
    where
        P: Clone,
    {
        Snapshot {
            alpha: self.alpha,
            labels: self.partition.labels(),
            params: self.partition.item_values(),
            global_params: self.global_sampler.snapshot(&self.density),
        }
    }

    /// Restore the chain from a snapshot, e.g. to resume a recorded chain.
    ///
    /// Labels need not be contiguous. Items with the same label share the
    /// parameter value of the first of them.
    pub fn set_state(&mut self, snapshot: &Snapshot<P, G::Global>) -> Result<()>
    where
        P: Clone,
    {
        let alpha = snapshot.alpha;
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(DpError::InvalidAlpha { alpha });
        }
        if snapshot.labels.len() != snapshot.params.len() {
            return Err(DpError::LabelLengthMismatch {
                n_labels: snapshot.labels.len(),
                n_params: snapshot.params.len(),
            });
        }
        if snapshot.labels.is_empty() {
            return Err(DpError::EmptyData);
        }

        let mut partition = Partition::new();
        let mut label_to_cell: HashMap<usize, usize> = HashMap::new();
        snapshot
            .labels
            .iter()
            .zip(snapshot.params.iter())
            .enumerate()
            .for_each(|(item, (&label, param))| {
                let ix = *label_to_cell
                    .entry(label)
                    .or_insert_with(|| partition.add_cell(param.clone()));
                partition.add_item(item, ix);
            });

        if let Some(global) = snapshot.global_params.clone() {
            self.global_sampler.restore(&mut self.density, global);
        }
        self.alpha = alpha;
        self.partition = partition;
        self.state = ChainState::Running;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BinomialDatum;
    use crate::dist::{Beta, BetaBinomial, BetaProposal, Binomial, Gamma, GammaProposal};
    use crate::sampler::{
        AuxiliaryGibbs, ConcentrationPrior, ConfigError, ConjugateAtomSampler,
        MarginalGibbs, MetropolisAtomSampler, MetropolisGlobalSampler,
    };
    use crate::trace::{MemoryTrace, TraceError};
    use crate::traits::GlobalParameterized;

    fn data() -> Vec<BinomialDatum> {
        [1, 2, 1, 18, 19, 17]
            .iter()
            .map(|&x| BinomialDatum::new(x, 20))
            .collect()
    }

    type BinomialSampler = DirichletProcessSampler<
        BinomialDatum,
        f64,
        Binomial,
        Beta,
        AuxiliaryGibbs,
        ConjugateAtomSampler,
    >;

    fn sampler(config: DpConfig) -> BinomialSampler {
        DirichletProcessSampler::new(
            Binomial,
            Beta::uniform(),
            AuxiliaryGibbs::default(),
            ConjugateAtomSampler,
            config,
        )
        .unwrap()
    }

    // Accepts `limit` snapshots, then fails
    struct Flaky {
        limit: usize,
        seen: usize,
    }

    impl<P, G> Trace<P, G> for Flaky {
        fn update(
            &mut self,
            _snapshot: Snapshot<P, G>,
        ) -> std::result::Result<(), TraceError> {
            if self.seen == self.limit {
                return Err(TraceError::Rejected("disk full".into()));
            }
            self.seen += 1;
            Ok(())
        }
    }

    #[test]
    fn new_validates_config() {
        let result = DirichletProcessSampler::new(
            Binomial,
            Beta::uniform(),
            MarginalGibbs,
            ConjugateAtomSampler,
            DpConfig::default().with_alpha(0.0),
        );
        assert!(matches!(
            result,
            Err(DpError::Config(ConfigError::InvalidAlpha { .. }))
        ));
    }

    #[test]
    fn empty_data_is_an_error() {
        let config = DpConfig::default().with_seed(1);
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let res = dp.sweep(&[], &mut rng);
        assert!(matches!(res, Err(DpError::EmptyData)));
        assert_eq!(dp.state(), ChainState::Uninitialized);
    }

    #[test]
    fn init_strategies() {
        let config = DpConfig::default().with_seed(2);
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let data = data();

        dp.initialise(&data, InitStrategy::Disconnected, &mut rng).unwrap();
        assert_eq!(dp.partition().n_cells(), 6);
        assert_eq!(dp.state(), ChainState::Running);

        dp.initialise(&data, InitStrategy::Connected, &mut rng).unwrap();
        assert_eq!(dp.partition().n_cells(), 1);
        assert_eq!(dp.partition().labels(), vec![0; 6]);
    }

    #[test]
    fn run_records_every_sweep() {
        let config = DpConfig::default().with_seed(3);
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let mut trace = MemoryTrace::new();

        dp.run(&data(), &mut trace, 25, &mut rng).unwrap();
        assert_eq!(trace.len(), 25);
        assert_eq!(dp.state(), ChainState::Done);
        assert!(trace.snapshots().iter().all(|s| {
            s.labels.len() == 6 && s.params.len() == 6 && s.global_params.is_none()
        }));

        // resuming continues the count
        dp.run(&data(), &mut trace, 5, &mut rng).unwrap();
        assert_eq!(dp.n_sweeps(), 30);
    }

    #[test]
    fn data_length_must_match_partition() {
        let config = DpConfig::default().with_seed(4);
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let data = data();
        dp.sweep(&data, &mut rng).unwrap();

        let res = dp.sweep(&data[..5], &mut rng);
        assert!(matches!(
            res,
            Err(DpError::PartitionSizeMismatch { n_items: 6, n_data: 5 })
        ));
    }

    #[test]
    fn trace_failure_leaves_chain_valid() {
        let config = DpConfig::default().with_seed(5);
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let mut trace = Flaky { limit: 3, seen: 0 };

        let res = dp.run(&data(), &mut trace, 10, &mut rng);
        assert!(matches!(res, Err(DpError::Trace(TraceError::Rejected(_)))));
        assert_eq!(dp.n_sweeps(), 4);
        assert_eq!(dp.state(), ChainState::Running);
        assert!(dp.partition().validate(6).is_ok());

        // and it can carry on
        let mut memory = MemoryTrace::new();
        dp.run(&data(), &mut memory, 2, &mut rng).unwrap();
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn same_seed_same_chain() {
        let run = || {
            let config = DpConfig::default()
                .with_seed(6)
                .with_alpha_prior(ConcentrationPrior::default());
            let mut rng = config.rng();
            let mut dp = sampler(config);
            let mut trace = MemoryTrace::new();
            dp.run(&data(), &mut trace, 20, &mut rng).unwrap();
            trace
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn alpha_moves_only_with_a_prior() {
        let config = DpConfig::default().with_seed(7).with_alpha(2.0);
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let mut trace = MemoryTrace::new();
        dp.run(&data(), &mut trace, 10, &mut rng).unwrap();
        assert!(trace.alphas().iter().all(|&a| a == 2.0));

        let config = DpConfig::default()
            .with_seed(7)
            .with_alpha(2.0)
            .with_alpha_prior(ConcentrationPrior { shape: 1.0, rate: 1.0 });
        let mut rng = config.rng();
        let mut dp = sampler(config);
        let mut trace = MemoryTrace::new();
        dp.run(&data(), &mut trace, 10, &mut rng).unwrap();
        assert!(trace.alphas().iter().any(|&a| a != 2.0));
    }

    #[test]
    fn set_state_relabels_by_first_appearance() {
        let mut dp = sampler(DpConfig::default());
        let snapshot = Snapshot {
            alpha: 0.5,
            labels: vec![7, 7, 2, 7, 2, 9],
            params: vec![0.1, 0.1, 0.8, 0.1, 0.8, 0.4],
            global_params: None,
        };
        dp.set_state(&snapshot).unwrap();

        assert_eq!(dp.alpha(), 0.5);
        assert_eq!(dp.partition().labels(), vec![0, 0, 1, 0, 1, 2]);
        assert_eq!(dp.partition().cell_values(), vec![&0.1, &0.8, &0.4]);
        assert_eq!(dp.snapshot().params, snapshot.params);
    }

    #[test]
    fn set_state_rejects_bad_snapshots() {
        let mut dp = sampler(DpConfig::default());
        let bad_alpha = Snapshot {
            alpha: -1.0,
            labels: vec![0],
            params: vec![0.5],
            global_params: None,
        };
        assert!(matches!(
            dp.set_state(&bad_alpha),
            Err(DpError::InvalidAlpha { .. })
        ));

        let short = Snapshot {
            alpha: 1.0,
            labels: vec![0, 0],
            params: vec![0.5],
            global_params: None,
        };
        assert!(matches!(
            dp.set_state(&short),
            Err(DpError::LabelLengthMismatch { n_labels: 2, n_params: 1 })
        ));
        assert_eq!(dp.state(), ChainState::Uninitialized);
    }

    #[test]
    fn global_parameters_are_traced_and_restored() {
        let config = DpConfig::default().with_seed(8);
        let mut rng = config.rng();
        let mut dp = DirichletProcessSampler::new(
            BetaBinomial::new(10.0).unwrap(),
            Beta::uniform(),
            AuxiliaryGibbs::default(),
            MetropolisAtomSampler::new(BetaProposal::new(10.0).unwrap()),
            config,
        )
        .unwrap()
        .with_global_sampler(MetropolisGlobalSampler::new(
            Gamma::new(1.0, 0.1).unwrap(),
            GammaProposal::new(5.0).unwrap(),
        ));

        let mut trace = MemoryTrace::new();
        dp.run(&data(), &mut trace, 20, &mut rng).unwrap();
        let last = trace.snapshots().last().unwrap().clone();
        assert_eq!(last.global_params, Some(dp.density().global()));

        let mut snapshot = last;
        snapshot.global_params = Some(3.25);
        dp.set_state(&snapshot).unwrap();
        assert_eq!(dp.density().global(), 3.25);
    }
}
