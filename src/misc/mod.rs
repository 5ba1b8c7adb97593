//! Numerical utilities and random variates
mod func;
mod quad;
pub mod rvs;

pub use func::*;
pub use quad::*;
