//! Capabilities the samplers are written against
//!
//! Every model component is a closed interface: the samplers never inspect
//! the shape of a parameter value, they only hand it to the component that
//! owns its interpretation.
use rand::Rng;

/// Likelihood of one observation given the parameter value of its cluster,
/// *f(x|θ)*.
///
/// Implementations must be deterministic: identical inputs return identical
/// outputs. Boundary cases (e.g. a success probability of exactly zero) must
/// return a well defined log likelihood (a finite value or `-∞`) rather than
/// NaN.
pub trait Density<X, P> {
    /// Log likelihood of `x` under `params`
    fn ln_f(&self, x: &X, params: &P) -> f64;

    /// Sum of the log likelihoods of `data[ix]` for every `ix` in `items`
    fn ln_f_items(&self, data: &[X], items: &[usize], params: &P) -> f64 {
        items.iter().map(|&ix| self.ln_f(&data[ix], params)).sum()
    }
}

/// The prior over cluster parameter values, *G₀*.
pub trait BaseMeasure<P> {
    /// Draw a parameter value from the base measure
    fn draw<R: Rng>(&self, rng: &mut R) -> P;

    /// Prior log density of `params`
    fn ln_f(&self, params: &P) -> f64;
}

/// A (possibly asymmetric) Metropolis-Hastings proposal over parameter
/// values, *q(θ'|θ)*.
pub trait Proposal<P> {
    /// Propose a new value given the current one
    fn draw<R: Rng>(&self, current: &P, rng: &mut R) -> P;

    /// Log density of proposing `proposed` from `current`
    fn ln_f(&self, proposed: &P, current: &P) -> f64;
}

/// A base measure that is conjugate to the likelihood of `X`.
///
/// Conjugacy lets the samplers integrate the parameter out (the prior
/// predictive, used to score a new cluster) and draw a cluster's parameter
/// directly from its posterior.
pub trait ConjugatePrior<X, P>: BaseMeasure<P> {
    /// Log prior predictive, ∫ f(x|θ) G₀(dθ)
    fn ln_pp(&self, x: &X) -> f64;

    /// Draw θ from the posterior given the observations `xs`
    fn draw_posterior<'a, I, R>(&self, xs: I, rng: &mut R) -> P
    where
        X: 'a,
        I: IntoIterator<Item = &'a X>,
        R: Rng;
}

/// A density whose likelihood also depends on parameters shared by every
/// cluster.
pub trait GlobalParameterized {
    type Global: Clone;

    /// The current value of the shared parameters
    fn global(&self) -> Self::Global;

    /// Replace the shared parameters
    fn set_global(&mut self, global: Self::Global);
}
