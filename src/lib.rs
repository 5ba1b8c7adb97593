//! Posterior inference for Dirichlet process mixture models by Markov chain
//! Monte Carlo.
//!
//! A chain is made of four kinds of update, run in a fixed order every sweep:
//!
//! 1. the concentration parameter, α ([`sampler::GammaPriorConcentration`]),
//! 2. the partition of the items into clusters ([`sampler::partition`]),
//! 3. the parameter value ("atom") of every cluster ([`sampler::atom`]),
//! 4. optionally, hyperparameters shared by every cluster
//!    ([`sampler::global`]).
//!
//! [`sampler::DirichletProcessSampler`] drives the sweeps and pushes a
//! [`trace::Snapshot`] to a [`trace::Trace`] sink after each one.
//!
//! # Example
//!
//! Cluster binomial observations under a Beta(1, 1) base measure.
//!
//! ```
//! use dpmix::prelude::*;
//!
//! let data: Vec<BinomialDatum> = [1, 2, 1, 18, 19, 17]
//!     .iter()
//!     .map(|&x| BinomialDatum::new(x, 20))
//!     .collect();
//!
//! let config = DpConfig::default().with_seed(1337);
//! let mut rng = config.rng();
//!
//! let mut sampler = DirichletProcessSampler::new(
//!     Binomial,
//!     Beta::uniform(),
//!     AuxiliaryGibbs::default(),
//!     ConjugateAtomSampler,
//!     config,
//! )
//! .unwrap();
//!
//! let mut trace = MemoryTrace::new();
//! sampler.run(&data, &mut trace, 200, &mut rng).unwrap();
//!
//! assert_eq!(trace.len(), 200);
//! ```
#![warn(clippy::all, clippy::imprecise_flops, clippy::suboptimal_flops)]

pub mod cache;
pub mod consts;
pub mod data;
pub mod dist;
pub mod misc;
pub mod prelude;
pub mod result;
pub mod sampler;
pub mod trace;
pub mod traits;
pub mod vector;

#[macro_export]
macro_rules! impl_display {
    ($kind: ty) => {
        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", String::from(self))
            }
        }
    };
}
