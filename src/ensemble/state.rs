//! Controller State
//!
//! Counters and flags of the ensemble controller, changed only through the
//! transitions below so the drift state machine can be checked on its own.
use crate::constants::MIN_WINDOW_AFTER_DRIFT;
use serde::{Deserialize, Serialize};

/// Where the controller stands with respect to concept drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No instance seen yet.
    Cold,
    Stable,
    /// The detector suspects a change.
    Warning,
    /// A change was confirmed, recovery runs on a later instance than the warning entry.
    DriftConfirmed,
}

/// Whether the index reflects the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexStatus {
    /// Must be rebuilt from the window before the next query.
    Stale,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub phase: Phase,
    pub index_status: IndexStatus,
    /// Instances trained so far, also the logical clock.
    pub instance_count: usize,
    /// Instances since the pool last grew.
    pub since_growth: usize,
    /// Instance at which the current warning started.
    pub warning_entry: Option<usize>,
    /// A confirmed change waiting for recovery.
    pub pending_change: bool,
    pub n_rebuilds: usize,
    pub n_drifts: usize,
    /// Instances at which a drift recovery ran.
    pub drift_points: Vec<usize>,
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState {
            phase: Phase::Cold,
            index_status: IndexStatus::Stale,
            instance_count: 0,
            since_growth: 0,
            warning_entry: None,
            pending_change: false,
            n_rebuilds: 0,
            n_drifts: 0,
            drift_points: Vec::new(),
        }
    }
}

impl ControllerState {
    pub fn is_cold(&self) -> bool {
        self.phase == Phase::Cold
    }

    /// First instance seen, the index exists but was never built.
    pub fn start(&mut self) {
        self.phase = Phase::Stable;
        self.index_status = IndexStatus::Stale;
    }

    /// The detector is only fed once the warm-up period is over.
    pub fn past_warm_up(&self, warm_up: usize) -> bool {
        self.instance_count > warm_up
    }

    pub fn index_ready(&self) -> bool {
        self.index_status == IndexStatus::Ready
    }

    pub fn mark_stale(&mut self) {
        self.index_status = IndexStatus::Stale;
    }

    pub fn mark_rebuilt(&mut self) {
        self.n_rebuilds += 1;
        self.index_status = IndexStatus::Ready;
    }

    /// Record the warning entry on a false to true transition.
    /// Returns whether a warning was entered on this call.
    pub fn observe_warning(&mut self, warning: bool) -> bool {
        if warning && self.warning_entry.is_none() {
            self.warning_entry = Some(self.instance_count);
            if self.phase != Phase::DriftConfirmed {
                self.phase = Phase::Warning;
            }
            return true;
        }
        false
    }

    pub fn confirm_change(&mut self) {
        self.pending_change = true;
        self.phase = Phase::DriftConfirmed;
    }

    /// Recovery never runs on the instance that entered the warning.
    pub fn recovery_due(&self) -> bool {
        self.pending_change && self.warning_entry != Some(self.instance_count)
    }

    /// Window size kept by a recovery: the points seen since the warning entry,
    /// never fewer than the minimum.
    pub fn retained_after_drift(&self) -> usize {
        match self.warning_entry {
            Some(entry) => self.instance_count.saturating_sub(entry).max(MIN_WINDOW_AFTER_DRIFT),
            None => MIN_WINDOW_AFTER_DRIFT,
        }
    }

    pub fn complete_recovery(&mut self) {
        self.pending_change = false;
        self.warning_entry = None;
        self.n_drifts += 1;
        self.drift_points.push(self.instance_count);
        self.since_growth = 0;
        self.phase = Phase::Stable;
    }

    /// Warning flag went back to false without a confirmed change.
    pub fn observe_warning_cleared(&mut self, warning: bool) {
        if !warning && self.warning_entry.is_some() && !self.pending_change {
            self.warning_entry = None;
            self.phase = Phase::Stable;
        }
    }

    pub fn growth_due(&self, training_batch_size: usize) -> bool {
        self.since_growth >= training_batch_size
    }

    pub fn pool_grew(&mut self) {
        self.since_growth = 0;
    }

    /// End of a training step.
    pub fn advance(&mut self) {
        self.since_growth += 1;
        self.instance_count += 1;
    }

    pub fn reset(&mut self) {
        *self = ControllerState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> ControllerState {
        let mut state = ControllerState::default();
        state.start();
        state
    }

    #[test]
    fn test_initial_state_is_cold() {
        let state = ControllerState::default();
        assert!(state.is_cold());
        assert!(!state.index_ready());
        assert!(!state.recovery_due());
    }

    #[test]
    fn test_warning_entry_and_clear() {
        let mut state = started();
        for _ in 0..10 {
            state.advance();
        }
        assert!(state.observe_warning(true));
        assert_eq!(state.phase, Phase::Warning);
        assert_eq!(state.warning_entry, Some(10));
        state.advance();
        // Staying in the warning zone keeps the first entry.
        assert!(!state.observe_warning(true));
        assert_eq!(state.warning_entry, Some(10));
        state.observe_warning_cleared(false);
        assert_eq!(state.phase, Phase::Stable);
        assert_eq!(state.warning_entry, None);
        assert_eq!(state.n_drifts, 0);
    }

    #[test]
    fn test_recovery_deferred_on_warning_entry_instance() {
        let mut state = started();
        for _ in 0..50 {
            state.advance();
        }
        state.observe_warning(true);
        state.confirm_change();
        assert_eq!(state.phase, Phase::DriftConfirmed);
        assert!(!state.recovery_due());
        state.advance();
        assert!(state.recovery_due());
        // The latch survives the warning flag going down.
        state.observe_warning_cleared(false);
        assert_eq!(state.warning_entry, Some(50));
    }

    #[test]
    fn test_recovery_keeps_points_since_warning() {
        let mut state = started();
        for _ in 0..100 {
            state.advance();
        }
        state.observe_warning(true);
        for _ in 0..40 {
            state.advance();
        }
        state.confirm_change();
        assert!(state.recovery_due());
        assert_eq!(state.retained_after_drift(), 40);
        state.since_growth = 17;
        state.complete_recovery();
        assert_eq!(state.phase, Phase::Stable);
        assert_eq!(state.n_drifts, 1);
        assert_eq!(state.drift_points, vec![140]);
        assert_eq!(state.since_growth, 0);
        assert_eq!(state.warning_entry, None);
        assert!(!state.recovery_due());
    }

    #[test]
    fn test_short_warning_keeps_minimum() {
        let mut state = started();
        state.advance();
        state.observe_warning(true);
        state.advance();
        assert_eq!(state.retained_after_drift(), MIN_WINDOW_AFTER_DRIFT);
        state.warning_entry = None;
        assert_eq!(state.retained_after_drift(), MIN_WINDOW_AFTER_DRIFT);
    }

    #[test]
    fn test_growth_and_reset() {
        let mut state = started();
        for _ in 0..3 {
            state.advance();
        }
        assert!(state.growth_due(3));
        state.pool_grew();
        assert!(!state.growth_due(3));
        state.mark_rebuilt();
        assert!(state.index_ready());
        assert_eq!(state.n_rebuilds, 1);
        state.mark_stale();
        assert!(!state.index_ready());
        state.reset();
        assert_eq!(state, ControllerState::default());
    }
}
