use rand::distributions::Open01;
use rand::Rng;
use special::Gamma as _;

/// Safely compute `log(sum(exp(xs)))`
///
/// `-∞` entries contribute nothing; if every entry is `-∞` the result is
/// `-∞`.
///
/// # Example
///
/// ```rust
/// # use dpmix::misc::logsumexp;
/// let xs = vec![0.0_f64.ln(), 1.0_f64.ln(), 3.0_f64.ln()];
/// assert!((logsumexp(&xs) - 4.0_f64.ln()).abs() < 1E-12);
///
/// let all_zero = vec![f64::NEG_INFINITY; 3];
/// assert_eq!(logsumexp(&all_zero), f64::NEG_INFINITY);
/// ```
///
/// # Panics
///
/// Panics if `xs` is empty.
pub fn logsumexp(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        panic!("Empty container");
    } else if xs.len() == 1 {
        xs[0]
    } else {
        let maxval = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if maxval.is_infinite() {
            return maxval;
        }
        xs.iter().fold(0.0, |acc, x| acc + (x - maxval).exp()).ln() + maxval
    }
}

/// `log(exp(a) + exp(b))` without leaving log space
pub fn logaddexp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        b
    } else if b == f64::NEG_INFINITY {
        a
    } else if a > b {
        (b - a).exp().ln_1p() + a
    } else {
        (a - b).exp().ln_1p() + b
    }
}

/// Shift log weights so that their exponentials sum to one
///
/// # Example
///
/// ```rust
/// # use dpmix::misc::ln_normalize;
/// let ln_ws = ln_normalize(&[1.0, 2.0, 3.0]);
/// let total: f64 = ln_ws.iter().map(|w| w.exp()).sum();
/// assert!((total - 1.0).abs() < 1E-12);
/// ```
pub fn ln_normalize(ln_weights: &[f64]) -> Vec<f64> {
    let z = logsumexp(ln_weights);
    ln_weights.iter().map(|w| w - z).collect()
}

#[inline]
fn binary_search(cws: &[f64], r: f64) -> usize {
    let mut left: usize = 0;
    let mut right: usize = cws.len();
    while left < right {
        let mid = (left + right) / 2;
        if cws[mid] < r {
            left = mid + 1;
        } else {
            right = mid;
        }
    }
    left
}

// Index of the first cumulative weight above r. Rounding can leave the
// last cumulative weight a hair under r, in which case the last index wins.
fn catflip(cws: &[f64], r: f64) -> usize {
    let ix = if cws.len() > 9 {
        binary_search(cws, r)
    } else {
        cws.iter().position(|&w| w > r).unwrap_or(cws.len())
    };
    ix.min(cws.len() - 1)
}

/// Draw an index in proportion to the (unnormalized) `weights`
///
/// # Panics
///
/// Panics if `weights` is empty or sums to zero.
pub fn pflip<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    if weights.is_empty() {
        panic!("Empty container");
    }
    let mut cws: Vec<f64> = weights.to_vec();
    for i in 1..cws.len() {
        cws[i] += cws[i - 1];
    }
    let scale = cws[cws.len() - 1];
    assert!(scale > 0.0, "Could not draw from {:?}", weights);

    let r = rng.sample::<f64, _>(Open01) * scale;
    // zero-weight entries are never chosen
    let ix = catflip(&cws, r);
    if weights[ix] > 0.0 {
        ix
    } else {
        weights.iter().rposition(|&w| w > 0.0).unwrap_or(ix)
    }
}

/// Draw an index according to log-domain weights
///
/// The weights need not be normalized; normalization happens in log space.
/// If every weight is `-∞` the index is drawn uniformly.
///
/// # Example
///
/// ```rust
/// use dpmix::misc::ln_pflip;
///
/// let mut rng = rand::thread_rng();
/// let ln_weights: Vec<f64> =
///     vec![0.4, 0.2, 0.3, 0.1].iter().map(|&w: &f64| w.ln()).collect();
///
/// let ix = ln_pflip(&ln_weights, &mut rng);
/// assert!(ix < 4);
/// ```
pub fn ln_pflip<R: Rng>(ln_weights: &[f64], rng: &mut R) -> usize {
    let z = logsumexp(ln_weights);
    if z == f64::NEG_INFINITY {
        return rng.gen_range(0..ln_weights.len());
    }
    let mut cws: Vec<f64> = ln_weights.iter().map(|w| (w - z).exp()).collect();
    for i in 1..cws.len() {
        cws[i] += cws[i - 1];
    }

    let r: f64 = rng.sample(Open01);
    let ix = catflip(&cws, r);
    if ln_weights[ix] > f64::NEG_INFINITY {
        ix
    } else {
        ln_weights
            .iter()
            .rposition(|&w| w > f64::NEG_INFINITY)
            .unwrap_or(ix)
    }
}

/// `x ln(y)` with the convention `0 ln(0) = 0`
///
/// ```rust
/// # use dpmix::misc::xlogy;
/// assert_eq!(xlogy(0.0, 0.0), 0.0);
/// assert_eq!(xlogy(2.0, 0.0), f64::NEG_INFINITY);
/// ```
#[inline]
pub fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * y.ln()
    }
}

/// Natural logarithm of the binomial coefficient, ln nCk
///
/// # Example
///
/// ```rust
/// use dpmix::misc::ln_binom;
///
/// assert!((ln_binom(4.0, 2.0) - 6.0_f64.ln()).abs() < 1E-12);
/// ```
pub fn ln_binom(n: f64, k: f64) -> f64 {
    (n + 1.0).ln_gamma().0 - (k + 1.0).ln_gamma().0 - (n - k + 1.0).ln_gamma().0
}

/// Natural logarithm of the beta function, ln B(a, b)
pub fn ln_beta(a: f64, b: f64) -> f64 {
    a.ln_gamma().0 + b.ln_gamma().0 - (a + b).ln_gamma().0
}

/// Log probability of a partition with cluster sizes `counts` under the
/// Dirichlet process (Chinese restaurant process) prior with concentration
/// `alpha`.
///
/// ```math
/// ln π(z) = k ln α + ln Γ(α) - ln Γ(n + α) + Σ ln Γ(n_k)
/// ```
///
/// where `Γ(α + n)/Γ(α)` is the rising factorial of α.
pub fn ln_crp(counts: &[usize], alpha: f64) -> f64 {
    let n: usize = counts.iter().sum();
    let k = counts.len() as f64;
    let gsum = counts
        .iter()
        .fold(0.0, |acc, &ct| acc + (ct as f64).ln_gamma().0);
    gsum + k.mul_add(
        alpha.ln(),
        alpha.ln_gamma().0 - (n as f64 + alpha).ln_gamma().0,
    )
}

/// Draw cluster labels for `n` items from the Chinese restaurant process
///
/// Labels are in order of first appearance.
pub fn crp_labels<R: Rng>(alpha: f64, n: usize, rng: &mut R) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut weights: Vec<f64> = vec![1.0, alpha];
    let mut labels: Vec<usize> = Vec::with_capacity(n);
    labels.push(0);

    for _ in 1..n {
        let zi = pflip(&weights, rng);
        let k = weights.len() - 1;
        labels.push(zi);
        if zi == k {
            weights[k] = 1.0;
            weights.push(alpha);
        } else {
            weights[zi] += 1.0;
        }
    }
    labels
}
