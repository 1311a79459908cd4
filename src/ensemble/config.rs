//! Ensemble Configuration
//!
//! Parameters of the ensemble controller, with defaults, validation and JSON
//! persistence.
use crate::constants::MIN_WINDOW_AFTER_DRIFT;
use crate::errors::DesDriftError;
use crate::metric::Metric;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_n_neighbors() -> usize {
    5
}
fn default_max_pool_size() -> usize {
    75
}
fn default_training_batch_size() -> usize {
    200
}
fn default_warm_up() -> usize {
    200
}
fn default_max_window_size() -> usize {
    1_000_000
}
fn default_metric() -> Metric {
    Metric::Canberra
}

/// Configuration for the `EnsembleController`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Number of classes in the stream, labels are `0..n_classes`.
    pub n_classes: usize,
    /// Neighborhood size used at prediction time.
    #[serde(default = "default_n_neighbors")]
    pub n_neighbors: usize,
    /// Pool capacity enforced by the pruning engine.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
    /// Instances trained into the newest member before a new one is spawned.
    #[serde(default = "default_training_batch_size")]
    pub training_batch_size: usize,
    /// Instances seen before the drift detector is fed.
    #[serde(default = "default_warm_up")]
    pub warm_up: usize,
    /// Hard cap on the sliding window.
    #[serde(default = "default_max_window_size")]
    pub max_window_size: usize,
    /// Neighbor search metric.
    #[serde(default = "default_metric")]
    pub metric: Metric,
    /// Seed for the placeholder prediction made before any learner exists.
    #[serde(default)]
    pub seed: u64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            n_classes: 2,
            n_neighbors: default_n_neighbors(),
            max_pool_size: default_max_pool_size(),
            training_batch_size: default_training_batch_size(),
            warm_up: default_warm_up(),
            max_window_size: default_max_window_size(),
            metric: default_metric(),
            seed: 0,
        }
    }
}

fn invalid(name: &str, expected: &str, value: usize) -> DesDriftError {
    DesDriftError::InvalidConfiguration(name.to_string(), expected.to_string(), value.to_string())
}

impl EnsembleConfig {
    pub fn new(n_classes: usize) -> Self {
        EnsembleConfig {
            n_classes,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DesDriftError> {
        if self.n_classes < 1 {
            return Err(invalid("n_classes", "at least 1", self.n_classes));
        }
        if self.n_neighbors < 1 {
            return Err(invalid("n_neighbors", "at least 1", self.n_neighbors));
        }
        if self.max_pool_size < 1 {
            return Err(invalid("max_pool_size", "at least 1", self.max_pool_size));
        }
        if self.training_batch_size < 1 {
            return Err(invalid("training_batch_size", "at least 1", self.training_batch_size));
        }
        if self.max_window_size < MIN_WINDOW_AFTER_DRIFT {
            return Err(invalid(
                "max_window_size",
                &format!("at least {}", MIN_WINDOW_AFTER_DRIFT),
                self.max_window_size,
            ));
        }
        Ok(())
    }

    /// Set the number of classes.
    pub fn set_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Set the neighborhood size.
    pub fn set_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    /// Set the pool capacity.
    pub fn set_max_pool_size(mut self, max_pool_size: usize) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Set the number of instances after which a new member is spawned.
    pub fn set_training_batch_size(mut self, training_batch_size: usize) -> Self {
        self.training_batch_size = training_batch_size;
        self
    }

    /// Set the number of instances before the detector is fed.
    pub fn set_warm_up(mut self, warm_up: usize) -> Self {
        self.warm_up = warm_up;
        self
    }

    /// Set the window cap.
    pub fn set_max_window_size(mut self, max_window_size: usize) -> Self {
        self.max_window_size = max_window_size;
        self
    }

    /// Set the search metric.
    pub fn set_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the seed.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), DesDriftError> {
        fs::write(path, self.json_dump()?).map_err(|e| DesDriftError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object.
    fn json_dump(&self) -> Result<String, DesDriftError> {
        serde_json::to_string(self).map_err(|e| DesDriftError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string.
    fn from_json(json_str: &str) -> Result<Self, DesDriftError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| DesDriftError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, DesDriftError> {
        let json_str = fs::read_to_string(path).map_err(|e| DesDriftError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for EnsembleConfig {}
