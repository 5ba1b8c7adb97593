//! Markov chain transition kernels and the driver that strings them together
pub mod atom;
mod concentration;
mod config;
mod dp;
pub mod global;
pub mod partition;

pub use atom::{AtomSampler, ConjugateAtomSampler, MetropolisAtomSampler};
pub use concentration::{ConcentrationError, GammaPriorConcentration};
pub use config::{ConcentrationPrior, ConfigError, DpConfig, InitStrategy};
pub use dp::{ChainState, DirichletProcessSampler};
pub use global::{
    GlobalParameterSampler, MetropolisGlobalSampler, NoGlobalUpdate,
};
pub use partition::{
    AuxiliaryGibbs, MarginalGibbs, MetropolisGibbs, MoveKind, PartitionSampler,
    PartitionSamplerError, SplitMerge, SplitMergeGibbs, SplitMergeMove,
};
