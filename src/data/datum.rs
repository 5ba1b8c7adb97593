#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// A binomial observation: `x` successes out of `n` trials
///
/// # Example
///
/// ```rust
/// use dpmix::data::BinomialDatum;
///
/// let datum = BinomialDatum::new(3, 10);
/// assert_eq!(datum.failures(), 7);
///
/// assert!(BinomialDatum::try_new(11, 10).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct BinomialDatum {
    /// Number of successes
    pub x: u32,
    /// Number of trials
    pub n: u32,
}

impl BinomialDatum {
    /// Create a new datum
    ///
    /// # Panics
    ///
    /// Panics if `x > n`.
    #[inline]
    pub fn new(x: u32, n: u32) -> Self {
        assert!(x <= n, "successes ({x}) exceed trials ({n})");
        BinomialDatum { x, n }
    }

    /// Create a new datum, or `None` if `x > n`
    #[inline]
    pub fn try_new(x: u32, n: u32) -> Option<Self> {
        (x <= n).then_some(BinomialDatum { x, n })
    }

    /// Number of failures, `n - x`
    #[inline]
    pub fn failures(&self) -> u32 {
        self.n - self.x
    }
}

impl From<BinomialDatum> for (u32, u32) {
    fn from(datum: BinomialDatum) -> Self {
        (datum.x, datum.n)
    }
}
