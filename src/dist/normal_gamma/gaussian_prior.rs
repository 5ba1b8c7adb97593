use rand::Rng;
use std::f64::consts::LN_2;

use crate::consts::{HALF_LN_2PI, HALF_LN_PI};
use crate::dist::{GaussianParams, NormalGamma};
use crate::traits::{BaseMeasure, ConjugatePrior};
use special::Gamma as _;

fn ln_z(r: f64, s: f64, v: f64) -> f64 {
    let half_v = 0.5 * v;
    (half_v + 0.5).mul_add(LN_2, HALF_LN_PI)
        - 0.5_f64.mul_add(r.ln(), half_v.mul_add(s.ln(), -half_v.ln_gamma().0))
}

impl NormalGamma {
    fn posterior<'a, I>(&self, xs: I) -> NormalGamma
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let (n, sum_x, sum_x_sq) = xs
            .into_iter()
            .fold((0.0, 0.0, 0.0), |(n, sx, sxx), &x| {
                (n + 1.0, sx + x, x.mul_add(x, sxx))
            });
        let r = self.r() + n;
        let v = self.v() + n;
        let m = self.m().mul_add(self.r(), sum_x) / r;
        let s = self.s()
            + sum_x_sq
            + self.r().mul_add(self.m() * self.m(), -r * m * m);
        NormalGamma::new_unchecked(m, r, s, v)
    }
}

impl ConjugatePrior<f64, GaussianParams> for NormalGamma {
    /// Student's t log density of `y`
    fn ln_pp(&self, y: &f64) -> f64 {
        let post = self.posterior(std::iter::once(y));
        ln_z(post.r(), post.s(), post.v())
            - ln_z(self.r(), self.s(), self.v())
            - HALF_LN_2PI
    }

    fn draw_posterior<'a, I, R>(&self, xs: I, rng: &mut R) -> GaussianParams
    where
        f64: 'a,
        I: IntoIterator<Item = &'a f64>,
        R: Rng,
    {
        self.posterior(xs).draw(rng)
    }
}
