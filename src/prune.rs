//! Pruning Engines
//!
//! Decide which pool members leave when a new learner would push the pool
//! past its capacity.
use crate::classifier::{ClassifierHandle, ClassifierPool, HandleId};
use crate::errors::DesDriftError;
use crate::window::SlidingWindow;
use log::debug;

pub trait PruningEngine {
    /// Ids of the handles to evict so that the pool, with `candidate` added,
    /// respects the capacity. The candidate's own id may be returned, the
    /// caller then drops the candidate instead of inserting it.
    fn prune(&self, candidate: &ClassifierHandle, pool: &ClassifierPool, reference: &SlidingWindow) -> Vec<HandleId>;
    /// Largest pool the engine lets through.
    fn max_pool_size(&self) -> usize;
    fn description(&self) -> String;
    fn short_description(&self) -> String;
}

/// Evicts the oldest members first.
#[derive(Debug, Clone)]
pub struct AgeBasedPruning {
    max_pool_size: usize,
}

impl AgeBasedPruning {
    pub fn new(max_pool_size: usize) -> Result<Self, DesDriftError> {
        if max_pool_size < 1 {
            return Err(DesDriftError::InvalidConfiguration(
                "max_pool_size".to_string(),
                "a value greater than 0".to_string(),
                max_pool_size.to_string(),
            ));
        }
        Ok(AgeBasedPruning { max_pool_size })
    }

}

impl PruningEngine for AgeBasedPruning {
    fn prune(&self, candidate: &ClassifierHandle, pool: &ClassifierPool, _reference: &SlidingWindow) -> Vec<HandleId> {
        // One slot is taken by the candidate.
        if pool.len() < self.max_pool_size {
            return Vec::new();
        }
        let n_evict = pool.len() + 1 - self.max_pool_size;

        // Pool order breaks ties between equal creation times, the candidate comes last.
        let mut ages: Vec<(u64, usize, HandleId)> = pool
            .iter()
            .enumerate()
            .map(|(pos, h)| (h.created_at, pos, h.id))
            .collect();
        ages.push((candidate.created_at, pool.len(), candidate.id));
        ages.sort_unstable();

        let evicted: Vec<HandleId> = ages.into_iter().take(n_evict).map(|(_, _, id)| id).collect();
        debug!("Age based pruning evicts {:?}", evicted);
        evicted
    }

    fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }

    fn description(&self) -> String {
        format!("Age Based Pruning Engine\nMax Pool Size: {}\n", self.max_pool_size)
    }

    fn short_description(&self) -> String {
        format!("AgePrun{}", self.max_pool_size)
    }
}
