use rand::Rng;

use crate::dist::Gamma;
use crate::misc::{ln_binom, rvs};
use crate::traits::ConjugatePrior;

impl ConjugatePrior<u32, f64> for Gamma {
    /// Negative binomial log probability of `y`
    fn ln_pp(&self, y: &u32) -> f64 {
        let r = self.shape();
        let p = 1.0 / (1.0 + self.rate());

        let k = f64::from(*y);
        let bnp = ln_binom(k + r - 1.0, k);
        bnp + (1.0 - p).ln() * r + k * p.ln()
    }

    fn draw_posterior<'a, I, R>(&self, xs: I, rng: &mut R) -> f64
    where
        u32: 'a,
        I: IntoIterator<Item = &'a u32>,
        R: Rng,
    {
        let (n, sum) = xs
            .into_iter()
            .fold((0_usize, 0.0), |(n, sum), &x| (n + 1, sum + f64::from(x)));
        rvs::draw_gamma(self.shape() + sum, self.rate() + n as f64, rng)
    }
}
