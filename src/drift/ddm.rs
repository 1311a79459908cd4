//! DDM (Drift Detection Method)
//!
//! Monitors the error rate of a classifier and signals drift when it rises
//! significantly above the best rate seen so far.
//!
//! Reference:
//! Gama, J., Medas, P., Castillo, G. and Rodrigues, P., 2004.
//! Learning with drift detection. In Brazilian symposium on artificial intelligence (pp. 286-295).
use super::DriftSignal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ddm {
    /// Inputs required before any flag can be raised.
    pub min_instances: usize,
    /// Warning level multiplier.
    pub warning_level: f64,
    /// Change level multiplier.
    pub change_level: f64,
    n: usize,
    /// Running error rate.
    p: f64,
    /// Standard deviation of the error rate.
    s: f64,
    p_min: f64,
    s_min: f64,
    in_warning: bool,
    in_change: bool,
}

impl Default for Ddm {
    fn default() -> Self {
        Self::new(30, 2.0, 3.0)
    }
}

impl Ddm {
    pub fn new(min_instances: usize, warning_level: f64, change_level: f64) -> Self {
        Ddm {
            min_instances,
            warning_level,
            change_level,
            n: 0,
            p: 0.0,
            s: 0.0,
            p_min: f64::MAX,
            s_min: f64::MAX,
            in_warning: false,
            in_change: false,
        }
    }

    /// Current error rate estimate.
    pub fn error_rate(&self) -> f64 {
        self.p
    }

    pub fn n_inputs(&self) -> usize {
        self.n
    }
}

impl DriftSignal for Ddm {
    fn input(&mut self, error: bool) {
        if self.in_change {
            self.reset();
        }
        let x = if error { 1.0 } else { 0.0 };
        self.n += 1;
        self.p += (x - self.p) / self.n as f64;
        self.s = (self.p * (1.0 - self.p) / self.n as f64).sqrt();

        self.in_warning = false;
        self.in_change = false;
        if self.n < self.min_instances {
            return;
        }

        let p_s = self.p + self.s;
        if p_s <= self.p_min + self.s_min {
            self.p_min = self.p;
            self.s_min = self.s;
        }
        if self.n > self.min_instances && p_s > self.p_min + self.change_level * self.s_min {
            self.in_change = true;
        } else if p_s > self.p_min + self.warning_level * self.s_min {
            self.in_warning = true;
        }
    }

    fn warning_zone(&self) -> bool {
        self.in_warning
    }

    fn change_confirmed(&self) -> bool {
        self.in_change
    }

    fn reset(&mut self) {
        *self = Self::new(self.min_instances, self.warning_level, self.change_level);
    }
}
