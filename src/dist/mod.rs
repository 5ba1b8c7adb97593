//! Model components: likelihoods, base measures and proposals
mod beta;
mod beta_binom;
mod binomial;
mod gamma;
mod gaussian;
mod normal_gamma;
mod poisson;
mod proposal;

pub use beta::{Beta, BetaError};
pub use beta_binom::{BetaBinomial, BetaBinomialError};
pub use binomial::Binomial;
pub use gamma::{Gamma, GammaError};
pub use gaussian::{Gaussian, GaussianParams};
pub use normal_gamma::{NormalGamma, NormalGammaError};
pub use poisson::Poisson;
pub use proposal::{BetaProposal, GammaProposal, PriorProposal, ProposalError};
