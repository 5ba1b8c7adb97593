use rand::Rng;

use crate::data::BinomialDatum;
use crate::dist::Beta;
use crate::misc::{ln_beta, ln_binom, rvs};
use crate::traits::ConjugatePrior;

impl Beta {
    /// Posterior parameters given binomial observations
    fn posterior_params<'a, I>(&self, xs: I) -> (f64, f64)
    where
        I: IntoIterator<Item = &'a BinomialDatum>,
    {
        xs.into_iter().fold((self.alpha(), self.beta()), |(a, b), x| {
            (a + f64::from(x.x), b + f64::from(x.failures()))
        })
    }
}

impl ConjugatePrior<BinomialDatum, f64> for Beta {
    /// Beta-binomial log probability of `x`
    fn ln_pp(&self, x: &BinomialDatum) -> f64 {
        let k = f64::from(x.x);
        let n = f64::from(x.n);
        ln_binom(n, k) + ln_beta(self.alpha() + k, self.beta() + n - k)
            - ln_beta(self.alpha(), self.beta())
    }

    fn draw_posterior<'a, I, R>(&self, xs: I, rng: &mut R) -> f64
    where
        BinomialDatum: 'a,
        I: IntoIterator<Item = &'a BinomialDatum>,
        R: Rng,
    {
        let (a, b) = self.posterior_params(xs);
        rvs::draw_beta(a, b, rng)
    }
}
