//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::data::{BinomialDatum, Partition};
#[doc(no_inline)]
pub use crate::dist::*;
#[doc(no_inline)]
pub use crate::result::DpError;
#[doc(no_inline)]
pub use crate::sampler::{
    AtomSampler, AuxiliaryGibbs, ChainState, ConcentrationPrior,
    ConjugateAtomSampler, DirichletProcessSampler, DpConfig,
    GlobalParameterSampler, InitStrategy, MarginalGibbs,
    MetropolisAtomSampler, MetropolisGibbs, MetropolisGlobalSampler,
    NoGlobalUpdate, PartitionSampler, SplitMerge, SplitMergeGibbs,
};
#[doc(no_inline)]
pub use crate::trace::{MemoryTrace, Snapshot, Trace};
#[doc(no_inline)]
pub use crate::traits::*;

/// A conjugate Beta-Binomial mixture sampled with the collapsed Gibbs
/// kernel
pub type BetaBinomialMixture = DirichletProcessSampler<
    BinomialDatum,
    f64,
    Binomial,
    Beta,
    MarginalGibbs,
    ConjugateAtomSampler,
>;
