//! Mathematical constants and sampler defaults

/// 0.5 ln(2π)
pub const HALF_LN_2PI: f64 = 0.918_938_533_204_672_7;
/// 0.5 ln(π)
pub const HALF_LN_PI: f64 = 0.572_364_942_924_700_1;

/// Smallest value returned by the gamma variate. Keeps `ln(x)` finite.
pub const GAMMA_DRAW_FLOOR: f64 = 1E-100;

/// Default number of auxiliary (empty candidate) clusters in Neal's
/// algorithm 8.
pub const DEFAULT_N_AUX: usize = 2;

/// Default capacity of the density LRU cache
pub const DEFAULT_CACHE_CAP: usize = 10_000;

/// Default number of sweeps between progress log lines
pub const DEFAULT_LOG_EVERY: usize = 100;
