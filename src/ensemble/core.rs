use crate::classifier::{
    ClassifierFactory, ClassifierHandle, ClassifierPool, GaussianNaiveBayesFactory, HandleId,
};
use crate::combiner::{Combiner, MajorityVote};
use crate::data::Point;
use crate::drift::{Ddm, DriftSignal};
use crate::ensemble::config::EnsembleConfig;
use crate::ensemble::state::{ControllerState, Phase};
use crate::errors::DesDriftError;
use crate::index::{AdaptiveIndex, NeighborIndex};
use crate::prune::{AgeBasedPruning, PruningEngine};
use crate::selection::{DynamicSelector, KnoraEliminate};
use crate::utils::argmax;
use crate::window::SlidingWindow;
use hashbrown::HashSet;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnReason {
    EmptyPool,
    Drift,
    BatchGrowth,
}

/// Dynamic ensemble selection over a stream with concept drift.
///
/// Owns the sliding window, the adaptive index built over it, the classifier
/// pool and the drift state machine. Every call runs to completion, a `Fatal`
/// error leaves the pipeline in an unspecified state.
pub struct EnsembleController {
    pub cfg: EnsembleConfig,
    pub(crate) index: Box<dyn NeighborIndex>,
    pub(crate) window: SlidingWindow,
    pub(crate) pool: ClassifierPool,
    pub(crate) state: ControllerState,
    pub(crate) factory: Box<dyn ClassifierFactory>,
    pub(crate) drift: Box<dyn DriftSignal>,
    pub(crate) combiner: Box<dyn Combiner>,
    pub(crate) pruning: Box<dyn PruningEngine>,
    pub(crate) selector: Box<dyn DynamicSelector>,
    pub(crate) rng: StdRng,
    next_id: HandleId,
}

impl EnsembleController {
    /// Ensemble controller with explicit collaborators.
    ///
    /// * `cfg` - Validated before anything else.
    /// * `factory` - Builds the learner of every new pool member.
    /// * `drift` - Fed with one misclassification bit per instance after the warm-up.
    /// * `combiner` - Merges the votes of the selected members, must score `cfg.n_classes` classes.
    /// * `pruning` - Keeps the pool within its capacity, which must be `cfg.max_pool_size`.
    pub fn new(
        cfg: EnsembleConfig,
        factory: Box<dyn ClassifierFactory>,
        drift: Box<dyn DriftSignal>,
        combiner: Box<dyn Combiner>,
        pruning: Box<dyn PruningEngine>,
    ) -> Result<Self, DesDriftError> {
        cfg.validate()?;
        if pruning.max_pool_size() != cfg.max_pool_size {
            return Err(DesDriftError::InvalidConfiguration(
                "pruning engine capacity".to_string(),
                cfg.max_pool_size.to_string(),
                pruning.max_pool_size().to_string(),
            ));
        }
        if combiner.n_classes() != cfg.n_classes {
            return Err(DesDriftError::InvalidConfiguration(
                "combiner class count".to_string(),
                cfg.n_classes.to_string(),
                combiner.n_classes().to_string(),
            ));
        }
        Ok(EnsembleController {
            index: Box::new(AdaptiveIndex::new(cfg.metric, cfg.n_neighbors)),
            window: SlidingWindow::new(cfg.max_window_size),
            pool: ClassifierPool::new(),
            state: ControllerState::default(),
            factory,
            drift,
            combiner,
            pruning,
            selector: Box::new(KnoraEliminate::default()),
            rng: StdRng::seed_from_u64(cfg.seed),
            next_id: 0,
            cfg,
        })
    }

    /// Gaussian naive Bayes members, DDM, majority vote and age based pruning.
    pub fn with_defaults(cfg: EnsembleConfig) -> Result<Self, DesDriftError> {
        cfg.validate()?;
        let factory = Box::new(GaussianNaiveBayesFactory::new(cfg.n_classes));
        let combiner = Box::new(MajorityVote::new(cfg.n_classes));
        let pruning = Box::new(AgeBasedPruning::new(cfg.max_pool_size)?);
        Self::new(cfg, factory, Box::new(Ddm::default()), combiner, pruning)
    }

    /// Replace the competence based selector.
    pub fn set_selector(mut self, selector: Box<dyn DynamicSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the neighbor index. The controller rebuilds it from the window before first use.
    pub fn set_index(mut self, index: Box<dyn NeighborIndex>) -> Self {
        self.index = index;
        self.state.mark_stale();
        self
    }

    /// Learn from one labeled instance.
    pub fn train(&mut self, point: Point) -> Result<(), DesDriftError> {
        point.check_label(self.cfg.n_classes)?;
        if point.features.is_empty() {
            return Err(DesDriftError::DimensionMismatch(1, 0));
        }
        point.check_finite()?;
        if let Some(last) = self.window.last() {
            point.check_dims(last.n_dims())?;
        }

        if self.state.is_cold() {
            self.index.clear();
            self.state.start();
        }

        // Test then train, the bit is computed before the pool sees the instance.
        if self.state.past_warm_up(self.cfg.warm_up) && !self.pool.is_empty() {
            let votes = self.predict(&point.features)?;
            self.drift.input(argmax(&votes) != Some(point.label));
        }

        self.observe(point.clone())?;
        if self.state.index_ready() && self.index.is_to_rebuild() {
            self.rebuild("imbalance")?;
        }

        let warning = self.drift.warning_zone();
        if self.state.observe_warning(warning) {
            debug!("Warning zone entered at instance {}.", self.state.instance_count);
        }
        let change = self.drift.change_confirmed();
        if change {
            self.state.confirm_change();
        }

        if self.pool.is_empty() {
            self.spawn(&point, SpawnReason::EmptyPool)?;
        } else if change {
            self.spawn(&point, SpawnReason::Drift)?;
        } else if self.state.growth_due(self.cfg.training_batch_size) {
            self.spawn(&point, SpawnReason::BatchGrowth)?;
        } else if let Some(newest) = self.pool.last_mut() {
            newest.train(&point);
        }

        if self.state.recovery_due() {
            self.recover()?;
        }
        self.state.observe_warning_cleared(warning);
        self.state.advance();
        Ok(())
    }

    /// Back to the cold state, the configuration and collaborators are kept.
    pub fn reset(&mut self) {
        self.window.clear();
        self.pool.clear();
        self.index.clear();
        self.drift.reset();
        self.state.reset();
        self.rng = StdRng::seed_from_u64(self.cfg.seed);
        self.next_id = 0;
    }

    /// Append to the window, keeping the index in step when it is built.
    fn observe(&mut self, point: Point) -> Result<(), DesDriftError> {
        if self.state.index_ready() {
            self.index.insert(point.clone())?;
        }
        if let Some(evicted) = self.window.push(point) {
            if self.state.index_ready() {
                self.index.remove(&evicted)?;
            }
        }
        Ok(())
    }

    pub(crate) fn rebuild(&mut self, reason: &str) -> Result<(), DesDriftError> {
        self.state.mark_stale();
        self.index.build(self.window.to_vec())?;
        self.state.mark_rebuilt();
        debug!(
            "Rebuilt the index with {} points ({}), rebuild {}.",
            self.index.len(),
            reason,
            self.state.n_rebuilds
        );
        Ok(())
    }

    fn spawn(&mut self, seed: &Point, reason: SpawnReason) -> Result<(), DesDriftError> {
        let classifier = self.factory.build(seed, &self.window).map_err(|e| match e {
            DesDriftError::Fatal(msg) => DesDriftError::Fatal(msg),
            other => DesDriftError::Fatal(format!("classifier factory failed: {}", other)),
        })?;
        let candidate = ClassifierHandle::new(self.next_id, self.state.instance_count as u64, classifier);
        self.next_id += 1;

        let evicted: HashSet<HandleId> = self
            .pruning
            .prune(&candidate, &self.pool, &self.window)
            .into_iter()
            .collect();
        self.pool.evict(&evicted);
        if evicted.contains(&candidate.id) {
            debug!("Classifier {} rejected by {}.", candidate.id, self.pruning.short_description());
        } else {
            if reason != SpawnReason::EmptyPool {
                info!(
                    "New classifier {} at instance {} ({:?}), pool size {}.",
                    candidate.id,
                    self.state.instance_count,
                    reason,
                    self.pool.len() + 1
                );
            }
            self.pool.push(candidate);
        }
        self.state.pool_grew();
        Ok(())
    }

    fn recover(&mut self) -> Result<(), DesDriftError> {
        self.drift.reset();
        let keep = self.state.retained_after_drift();
        let dropped = self.window.retain_recent(keep);
        self.rebuild("drift")?;
        self.state.complete_recovery();
        info!(
            "Drift {} confirmed at instance {}, dropped {} points and kept {}.",
            self.state.n_drifts,
            self.state.instance_count,
            dropped,
            self.window.len()
        );
        Ok(())
    }

    pub fn n_rebuilds(&self) -> usize {
        self.state.n_rebuilds
    }

    pub fn n_drifts_detected(&self) -> usize {
        self.state.n_drifts
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn n_instances(&self) -> usize {
        self.state.instance_count
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Instances at which a drift recovery ran.
    pub fn drift_points(&self) -> &[usize] {
        &self.state.drift_points
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn pool(&self) -> &ClassifierPool {
        &self.pool
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn index(&self) -> &dyn NeighborIndex {
        self.index.as_ref()
    }
}
