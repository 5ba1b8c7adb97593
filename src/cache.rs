//! A bounded memo of likelihood evaluations
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroUsize;

use lru::LruCache;
use thiserror::Error;

use crate::consts::DEFAULT_CACHE_CAP;
use crate::data::BinomialDatum;
use crate::dist::GaussianParams;
use crate::traits::{Density, GlobalParameterized};

/// A hashable stand-in for a datum or parameter value.
///
/// Floats are keyed by their bit pattern, so `0.0` and `-0.0` are distinct
/// keys and every NaN payload is its own key.
pub trait CacheKey {
    type Key: Hash + Eq + Clone;

    fn cache_key(&self) -> Self::Key;
}

impl CacheKey for u32 {
    type Key = u32;

    fn cache_key(&self) -> u32 {
        *self
    }
}

impl CacheKey for f64 {
    type Key = u64;

    fn cache_key(&self) -> u64 {
        self.to_bits()
    }
}

impl CacheKey for BinomialDatum {
    type Key = (u32, u32);

    fn cache_key(&self) -> (u32, u32) {
        (self.x, self.n)
    }
}

impl CacheKey for GaussianParams {
    type Key = (u64, u64);

    fn cache_key(&self) -> (u64, u64) {
        (self.mean.to_bits(), self.precision.to_bits())
    }
}

impl<T: CacheKey> CacheKey for Vec<T> {
    type Key = Vec<T::Key>;

    fn cache_key(&self) -> Vec<T::Key> {
        self.iter().map(CacheKey::cache_key).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// An LRU cache must hold at least one entry
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
}

/// Wraps a [`Density`] with a least-recently-used cache of its log
/// likelihoods, keyed by `(datum, parameter value)`.
///
/// Samplers evaluate the same datum against the same cluster value many
/// times per sweep, so expensive likelihoods (e.g. ones that integrate
/// numerically) benefit from the memo. Changing the global parameters
/// through [`GlobalParameterized::set_global`] empties the cache.
///
/// # Example
///
/// ```rust
/// use dpmix::cache::CachedDensity;
/// use dpmix::dist::Poisson;
/// use dpmix::traits::Density;
///
/// let density: CachedDensity<u32, f64, _> =
///     CachedDensity::new(Poisson, 2).unwrap();
///
/// let a = density.ln_f(&3, &1.5);
/// assert_eq!(density.len(), 1);
///
/// // hit
/// assert_eq!(density.ln_f(&3, &1.5), a);
/// assert_eq!(density.len(), 1);
///
/// // the least recently used entry is evicted
/// density.ln_f(&4, &1.5);
/// density.ln_f(&5, &1.5);
/// assert_eq!(density.len(), 2);
/// ```
pub struct CachedDensity<X: CacheKey, P: CacheKey, D> {
    density: D,
    cache: RefCell<LruCache<(X::Key, P::Key), f64>>,
    _phantom: PhantomData<fn(&X, &P)>,
}

impl<X: CacheKey, P: CacheKey, D> CachedDensity<X, P, D> {
    /// Wrap `density` with a cache holding at most `cap` entries
    pub fn new(density: D, cap: usize) -> Result<Self, CacheError> {
        let cap = NonZeroUsize::new(cap).ok_or(CacheError::ZeroCapacity)?;
        Ok(CachedDensity {
            density,
            cache: RefCell::new(LruCache::new(cap)),
            _phantom: PhantomData,
        })
    }

    /// Wrap `density` with a cache of the default capacity
    pub fn with_default_capacity(density: D) -> Self {
        let cap = NonZeroUsize::new(DEFAULT_CACHE_CAP)
            .unwrap_or(NonZeroUsize::MIN);
        CachedDensity {
            density,
            cache: RefCell::new(LruCache::new(cap)),
            _phantom: PhantomData,
        }
    }

    /// The wrapped density
    pub fn inner(&self) -> &D {
        &self.density
    }

    /// Unwrap the density, dropping the cache
    pub fn into_inner(self) -> D {
        self.density
    }

    /// Number of cached evaluations
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Maximum number of cached evaluations
    pub fn cap(&self) -> usize {
        self.cache.borrow().cap().get()
    }

    /// Drop every cached evaluation
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<X, P, D> Density<X, P> for CachedDensity<X, P, D>
where
    X: CacheKey,
    P: CacheKey,
    D: Density<X, P>,
{
    fn ln_f(&self, x: &X, params: &P) -> f64 {
        let key = (x.cache_key(), params.cache_key());
        let mut cache = self.cache.borrow_mut();
        if let Some(&value) = cache.get(&key) {
            return value;
        }
        let value = self.density.ln_f(x, params);
        cache.put(key, value);
        value
    }
}

impl<X, P, D> GlobalParameterized for CachedDensity<X, P, D>
where
    X: CacheKey,
    P: CacheKey,
    D: GlobalParameterized,
{
    type Global = D::Global;

    fn global(&self) -> D::Global {
        self.density.global()
    }

    fn set_global(&mut self, global: D::Global) {
        self.density.set_global(global);
        self.clear();
    }
}

impl<X: CacheKey, P: CacheKey, D: Clone> Clone for CachedDensity<X, P, D> {
    fn clone(&self) -> Self {
        let old_cache = self.cache.borrow();
        let mut cache = LruCache::new(old_cache.cap());
        // oldest first so the recency order carries over
        for (key, value) in old_cache.iter().rev() {
            cache.put(key.clone(), *value);
        }
        CachedDensity {
            density: self.density.clone(),
            cache: RefCell::new(cache),
            _phantom: PhantomData,
        }
    }
}

impl<X: CacheKey, P: CacheKey, D: fmt::Debug> fmt::Debug
    for CachedDensity<X, P, D>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedDensity")
            .field("density", &self.density)
            .field("len", &self.len())
            .field("cap", &self.cap())
            .finish()
    }
}
