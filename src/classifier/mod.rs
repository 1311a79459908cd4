//! Classifiers
//!
//! Incremental learners are used through `TrainableClassifier` only. The pool
//! wraps each one in a `ClassifierHandle` carrying the metrics the pruning
//! engines look at.

pub mod naive_bayes;

pub use naive_bayes::{GaussianNaiveBayes, GaussianNaiveBayesFactory};

use crate::data::Point;
use crate::errors::DesDriftError;
use crate::utils::argmax;
use crate::window::SlidingWindow;
use hashbrown::HashSet;

/// An incremental learner.
pub trait TrainableClassifier {
    /// Update the model with one labeled point.
    fn train(&mut self, point: &Point);
    /// Class score vector, one entry per class.
    fn predict_distribution(&self, features: &[f64]) -> Vec<f64>;
    /// Whether the arg-max of the distribution is the point's label.
    fn correctly_classifies(&self, point: &Point) -> bool {
        argmax(&self.predict_distribution(&point.features)) == Some(point.label)
    }
}

/// Builds fresh learners when the pool grows.
pub trait ClassifierFactory {
    /// `seed` is the instance that triggered the spawn, `window` the recent history.
    fn build(&self, seed: &Point, window: &SlidingWindow) -> Result<Box<dyn TrainableClassifier>, DesDriftError>;
}

pub type HandleId = u64;

/// Step applied to the usage factor.
pub const USAGE_FACTOR_STEP: f64 = 1.0;

/// A pool member: the learner and its bookkeeping.
pub struct ClassifierHandle {
    pub id: HandleId,
    /// Logical time of creation, the controller's instance counter at spawn.
    pub created_at: u64,
    usage_factor: f64,
    classifier: Box<dyn TrainableClassifier>,
}

impl ClassifierHandle {
    pub fn new(id: HandleId, created_at: u64, classifier: Box<dyn TrainableClassifier>) -> Self {
        ClassifierHandle {
            id,
            created_at,
            usage_factor: 0.0,
            classifier,
        }
    }

    pub fn usage_factor(&self) -> f64 {
        self.usage_factor
    }

    pub fn increase_usage(&mut self) {
        self.usage_factor += USAGE_FACTOR_STEP;
    }

    pub fn decrease_usage(&mut self) {
        self.usage_factor -= USAGE_FACTOR_STEP;
    }

    pub fn classifier(&self) -> &dyn TrainableClassifier {
        self.classifier.as_ref()
    }

    pub fn train(&mut self, point: &Point) {
        self.classifier.train(point);
    }

    pub fn predict_distribution(&self, features: &[f64]) -> Vec<f64> {
        self.classifier.predict_distribution(features)
    }

    pub fn correctly_classifies(&self, point: &Point) -> bool {
        self.classifier.correctly_classifies(point)
    }
}

/// Insertion-ordered collection of handles.
#[derive(Default)]
pub struct ClassifierPool {
    handles: Vec<ClassifierHandle>,
}

impl ClassifierPool {
    pub fn new() -> Self {
        ClassifierPool { handles: Vec::new() }
    }

    pub fn push(&mut self, handle: ClassifierHandle) {
        self.handles.push(handle);
    }

    /// Remove every handle whose id is in `ids`, keeping the others in order.
    pub fn evict(&mut self, ids: &HashSet<HandleId>) -> usize {
        let before = self.handles.len();
        self.handles.retain(|h| !ids.contains(&h.id));
        before - self.handles.len()
    }

    /// Most recently added member.
    pub fn last_mut(&mut self) -> Option<&mut ClassifierHandle> {
        self.handles.last_mut()
    }

    pub fn get(&self, i: usize) -> Option<&ClassifierHandle> {
        self.handles.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassifierHandle> {
        self.handles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ClassifierHandle> {
        self.handles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Always predicts the same class.
    pub(crate) struct ConstantClassifier {
        pub class: usize,
        pub n_classes: usize,
        pub n_trained: usize,
    }

    impl TrainableClassifier for ConstantClassifier {
        fn train(&mut self, _point: &Point) {
            self.n_trained += 1;
        }
        fn predict_distribution(&self, _features: &[f64]) -> Vec<f64> {
            let mut d = vec![0.0; self.n_classes];
            d[self.class] = 1.0;
            d
        }
    }

    pub(crate) fn constant(class: usize, n_classes: usize) -> Box<dyn TrainableClassifier> {
        Box::new(ConstantClassifier {
            class,
            n_classes,
            n_trained: 0,
        })
    }

    #[test]
    fn test_pool_evict_keeps_order() {
        let mut pool = ClassifierPool::new();
        for id in 0..5 {
            pool.push(ClassifierHandle::new(id, id * 10, constant(0, 2)));
        }
        let ids: HashSet<HandleId> = [1, 3].into_iter().collect();
        assert_eq!(pool.evict(&ids), 2);
        let left: Vec<HandleId> = pool.iter().map(|h| h.id).collect();
        assert_eq!(left, vec![0, 2, 4]);
        assert_eq!(pool.last_mut().unwrap().id, 4);
        assert_eq!(pool.get(1).unwrap().created_at, 20);
    }

    #[test]
    fn test_handle_usage_and_correctness() {
        let mut handle = ClassifierHandle::new(7, 0, constant(1, 3));
        handle.increase_usage();
        handle.increase_usage();
        handle.decrease_usage();
        assert_eq!(handle.usage_factor(), 1.0);
        assert!(handle.correctly_classifies(&Point::new(vec![0.0], 1)));
        assert!(!handle.correctly_classifies(&Point::new(vec![0.0], 2)));
        assert_eq!(handle.predict_distribution(&[0.0]), vec![0.0, 1.0, 0.0]);
    }
}
