//! Vector valued atoms built from independent scalar components
//!
//! A cluster value is a `Vec<P>` with one entry per dimension, and a datum
//! is a `Vec<X>`. Each dimension has its own density, base measure and
//! proposal, and the dimensions are independent given the cluster, so log
//! densities add across dimensions.
use rand::Rng;
use thiserror::Error;

use crate::traits::{
    BaseMeasure, ConjugatePrior, Density, GlobalParameterized, Proposal,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorError {
    /// A vector model needs at least one dimension
    #[error("a vector model needs at least one component")]
    NoComponents,
}

// Mismatched lengths would otherwise be truncated by `zip`
fn check_dims(len: usize, n_dims: usize, what: &str) {
    assert_eq!(len, n_dims, "{what} has {len} dimensions, model has {n_dims}");
}

fn nonempty<T>(components: Vec<T>) -> Result<Vec<T>, VectorError> {
    if components.is_empty() {
        Err(VectorError::NoComponents)
    } else {
        Ok(components)
    }
}

/// A product of per-dimension likelihoods
///
/// # Example
///
/// ```rust
/// use dpmix::dist::{Gaussian, GaussianParams};
/// use dpmix::traits::Density;
/// use dpmix::vector::VectorDensity;
///
/// let density = VectorDensity::new(vec![Gaussian, Gaussian]).unwrap();
/// let params = vec![GaussianParams::new(0.0, 1.0), GaussianParams::new(1.0, 4.0)];
/// let x = vec![0.5, 1.5];
///
/// let expected = Gaussian.ln_f(&0.5, &params[0]) + Gaussian.ln_f(&1.5, &params[1]);
/// assert!((density.ln_f(&x, &params) - expected).abs() < 1E-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDensity<D> {
    components: Vec<D>,
}

impl<D> VectorDensity<D> {
    pub fn new(components: Vec<D>) -> Result<Self, VectorError> {
        nonempty(components).map(|components| VectorDensity { components })
    }

    /// Number of dimensions
    pub fn n_dims(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[D] {
        &self.components
    }
}

impl<X, P, D: Density<X, P>> Density<Vec<X>, Vec<P>> for VectorDensity<D> {
    fn ln_f(&self, x: &Vec<X>, params: &Vec<P>) -> f64 {
        check_dims(x.len(), self.components.len(), "datum");
        check_dims(params.len(), self.components.len(), "parameter");
        self.components
            .iter()
            .zip(x.iter().zip(params.iter()))
            .map(|(density, (xd, pd))| density.ln_f(xd, pd))
            .sum()
    }
}

/// Each dimension keeps its own global parameters
impl<D: GlobalParameterized> GlobalParameterized for VectorDensity<D> {
    type Global = Vec<D::Global>;

    fn global(&self) -> Vec<D::Global> {
        self.components.iter().map(|density| density.global()).collect()
    }

    fn set_global(&mut self, global: Vec<D::Global>) {
        assert_eq!(
            global.len(),
            self.components.len(),
            "one global value per dimension"
        );
        self.components
            .iter_mut()
            .zip(global)
            .for_each(|(density, g)| density.set_global(g));
    }
}

/// A product of per-dimension base measures
#[derive(Debug, Clone, PartialEq)]
pub struct VectorBaseMeasure<B> {
    components: Vec<B>,
}

impl<B> VectorBaseMeasure<B> {
    pub fn new(components: Vec<B>) -> Result<Self, VectorError> {
        nonempty(components).map(|components| VectorBaseMeasure { components })
    }

    pub fn n_dims(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[B] {
        &self.components
    }
}

impl<P, B: BaseMeasure<P>> BaseMeasure<Vec<P>> for VectorBaseMeasure<B> {
    fn draw<R: Rng>(&self, rng: &mut R) -> Vec<P> {
        self.components.iter().map(|base| base.draw(rng)).collect()
    }

    fn ln_f(&self, params: &Vec<P>) -> f64 {
        check_dims(params.len(), self.components.len(), "parameter");
        self.components
            .iter()
            .zip(params.iter())
            .map(|(base, pd)| base.ln_f(pd))
            .sum()
    }
}

/// Conjugacy carries over dimension by dimension
impl<X, P, B> ConjugatePrior<Vec<X>, Vec<P>> for VectorBaseMeasure<B>
where
    B: ConjugatePrior<X, P>,
{
    fn ln_pp(&self, x: &Vec<X>) -> f64 {
        check_dims(x.len(), self.components.len(), "datum");
        self.components
            .iter()
            .zip(x.iter())
            .map(|(base, xd)| base.ln_pp(xd))
            .sum()
    }

    fn draw_posterior<'a, I, R>(&self, xs: I, rng: &mut R) -> Vec<P>
    where
        Vec<X>: 'a,
        I: IntoIterator<Item = &'a Vec<X>>,
        R: Rng,
    {
        let xs: Vec<&Vec<X>> = xs.into_iter().collect();
        let n_dims = self.components.len();
        xs.iter().for_each(|x| check_dims(x.len(), n_dims, "datum"));
        self.components
            .iter()
            .enumerate()
            .map(|(d, base)| {
                base.draw_posterior(xs.iter().map(move |&x| &x[d]), rng)
            })
            .collect()
    }
}

/// Per-dimension proposals applied jointly
#[derive(Debug, Clone, PartialEq)]
pub struct VectorProposal<Q> {
    components: Vec<Q>,
}

impl<Q> VectorProposal<Q> {
    pub fn new(components: Vec<Q>) -> Result<Self, VectorError> {
        nonempty(components).map(|components| VectorProposal { components })
    }
}

impl<P, Q: Proposal<P>> Proposal<Vec<P>> for VectorProposal<Q> {
    fn draw<R: Rng>(&self, current: &Vec<P>, rng: &mut R) -> Vec<P> {
        check_dims(current.len(), self.components.len(), "parameter");
        self.components
            .iter()
            .zip(current.iter())
            .map(|(q, pd)| q.draw(pd, rng))
            .collect()
    }

    fn ln_f(&self, proposed: &Vec<P>, current: &Vec<P>) -> f64 {
        check_dims(proposed.len(), self.components.len(), "parameter");
        check_dims(current.len(), self.components.len(), "parameter");
        self.components
            .iter()
            .zip(proposed.iter().zip(current.iter()))
            .map(|(q, (new, old))| q.ln_f(new, old))
            .sum()
    }
}
