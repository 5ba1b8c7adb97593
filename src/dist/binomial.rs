//! Binomial likelihood over successes in n trials
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::data::BinomialDatum;
use crate::misc::{ln_binom, xlogy};
use crate::traits::Density;

/// [Binomial](https://en.wikipedia.org/wiki/Binomial_distribution)
/// likelihood of `x` successes in `n` trials given the success probability
/// `p` of the cluster.
///
/// `p = 0` and `p = 1` are supported and give log likelihoods of 0 or -∞.
///
/// # Example
///
/// ```rust
/// use dpmix::data::BinomialDatum;
/// use dpmix::dist::Binomial;
/// use dpmix::traits::Density;
///
/// let x = BinomialDatum::new(2, 4);
/// let ln_f = Binomial.ln_f(&x, &0.5);
/// assert!((ln_f - (6.0_f64 / 16.0).ln()).abs() < 1E-12);
///
/// assert!(Binomial.ln_f(&BinomialDatum::new(0, 4), &0.0).abs() < 1E-12);
/// assert_eq!(Binomial.ln_f(&x, &0.0), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Binomial;

impl Density<BinomialDatum, f64> for Binomial {
    fn ln_f(&self, x: &BinomialDatum, p: &f64) -> f64 {
        if !(0.0..=1.0).contains(p) {
            return f64::NEG_INFINITY;
        }
        let k = f64::from(x.x);
        let n = f64::from(x.n);
        ln_binom(n, k) + xlogy(k, *p) + xlogy(n - k, 1.0 - p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    #[test]
    fn ln_f_sums_to_one() {
        let total: f64 = (0..=15)
            .map(|x| Binomial.ln_f(&BinomialDatum::new(x, 15), &0.3).exp())
            .sum();
        assert::close(total, 1.0, TOL);
    }

    #[test]
    fn certain_success() {
        assert::close(Binomial.ln_f(&BinomialDatum::new(7, 7), &1.0), 0.0, TOL);
        assert_eq!(
            Binomial.ln_f(&BinomialDatum::new(6, 7), &1.0),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn out_of_range_p() {
        let x = BinomialDatum::new(1, 2);
        assert_eq!(Binomial.ln_f(&x, &-0.1), f64::NEG_INFINITY);
        assert_eq!(Binomial.ln_f(&x, &f64::NAN), f64::NEG_INFINITY);
    }
}
