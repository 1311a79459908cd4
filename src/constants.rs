/// Deactivated share of the index population that makes a rebuild due.
pub const REBUILD_DEACTIVATED_RATIO: f64 = 0.3;
/// Growth over the last rebuilt population that makes a rebuild due.
pub const REBUILD_GROWTH_FACTOR: usize = 2;
/// Smallest window kept after a drift recovery.
pub const MIN_WINDOW_AFTER_DRIFT: usize = 5;
/// Variance floor for the naive Bayes gaussian likelihoods.
pub const MIN_VARIANCE: f64 = 1e-9;
