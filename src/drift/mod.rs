//! Drift Detection
//!
//! The ensemble only sees a drift detector through `DriftSignal`: it feeds one
//! correctness bit per instance and reads back a warning and a change flag.

pub mod ddm;

pub use ddm::Ddm;

/// Three-signal interface of a concept drift detector.
pub trait DriftSignal {
    /// Feed one outcome, `true` when the instance was misclassified.
    fn input(&mut self, error: bool);
    /// Drift is suspected but not confirmed.
    fn warning_zone(&self) -> bool;
    /// Drift was confirmed by the last input.
    fn change_confirmed(&self) -> bool;
    /// Restart from the initial statistics.
    fn reset(&mut self);
}
