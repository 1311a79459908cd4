//! Gaussian Naive Bayes
//!
//! Incremental learner with running per-class, per-feature mean and variance
//! (Welford updates). Used as the default pool member.
use super::{ClassifierFactory, TrainableClassifier};
use crate::constants::MIN_VARIANCE;
use crate::data::Point;
use crate::errors::DesDriftError;
use crate::window::SlidingWindow;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
struct RunningStats {
    n: f64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn update(&mut self, x: f64) {
        self.n += 1.0;
        let delta = x - self.mean;
        self.mean += delta / self.n;
        self.m2 += delta * (x - self.mean);
    }

    fn variance(&self) -> f64 {
        let var = if self.n > 1.0 { self.m2 / (self.n - 1.0) } else { 0.0 };
        var.max(MIN_VARIANCE)
    }

    fn log_pdf(&self, x: f64) -> f64 {
        let var = self.variance();
        -0.5 * ((2.0 * PI * var).ln() + (x - self.mean).powi(2) / var)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GaussianNaiveBayes {
    pub n_classes: usize,
    class_counts: Vec<f64>,
    /// `[class][feature]`, sized on the first training point.
    stats: Vec<Vec<RunningStats>>,
}

impl GaussianNaiveBayes {
    pub fn new(n_classes: usize) -> Self {
        GaussianNaiveBayes {
            n_classes,
            class_counts: vec![0.0; n_classes],
            stats: Vec::new(),
        }
    }

    pub fn n_trained(&self) -> f64 {
        self.class_counts.iter().sum()
    }
}

impl TrainableClassifier for GaussianNaiveBayes {
    fn train(&mut self, point: &Point) {
        if point.label >= self.n_classes {
            return;
        }
        if self.stats.is_empty() {
            self.stats = vec![vec![RunningStats::default(); point.n_dims()]; self.n_classes];
        }
        self.class_counts[point.label] += 1.0;
        for (s, x) in self.stats[point.label].iter_mut().zip(point.features.iter()) {
            s.update(*x);
        }
    }

    fn predict_distribution(&self, features: &[f64]) -> Vec<f64> {
        let total = self.n_trained();
        if total == 0.0 {
            return vec![1.0 / self.n_classes as f64; self.n_classes];
        }
        let log_scores: Vec<f64> = (0..self.n_classes)
            .map(|c| {
                if self.class_counts[c] == 0.0 {
                    return f64::NEG_INFINITY;
                }
                let prior = (self.class_counts[c] + 1.0) / (total + self.n_classes as f64);
                let likelihood: f64 = self.stats[c]
                    .iter()
                    .zip(features.iter())
                    .map(|(s, x)| s.log_pdf(*x))
                    .sum();
                prior.ln() + likelihood
            })
            .collect();
        let max = log_scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = log_scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.iter().map(|e| e / sum).collect()
    }
}

/// Builds `GaussianNaiveBayes` learners.
///
/// With `warm_start == 0` the new model only sees the seed instance, otherwise
/// it is trained on the `warm_start` most recent window points (the controller
/// has already appended the seed to the window at that point).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GaussianNaiveBayesFactory {
    pub n_classes: usize,
    pub warm_start: usize,
}

impl GaussianNaiveBayesFactory {
    pub fn new(n_classes: usize) -> Self {
        GaussianNaiveBayesFactory {
            n_classes,
            warm_start: 0,
        }
    }

    pub fn set_warm_start(mut self, warm_start: usize) -> Self {
        self.warm_start = warm_start;
        self
    }
}

impl ClassifierFactory for GaussianNaiveBayesFactory {
    fn build(&self, seed: &Point, window: &SlidingWindow) -> Result<Box<dyn TrainableClassifier>, DesDriftError> {
        seed.check_label(self.n_classes)?;
        let mut model = GaussianNaiveBayes::new(self.n_classes);
        if self.warm_start == 0 {
            model.train(seed);
        } else {
            let skip = window.len().saturating_sub(self.warm_start);
            for p in window.iter().skip(skip) {
                model.train(p);
            }
        }
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untrained_is_uniform() {
        let model = GaussianNaiveBayes::new(4);
        assert_eq!(model.predict_distribution(&[1.0]), vec![0.25; 4]);
    }

    #[test]
    fn test_separates_two_blobs() {
        let mut model = GaussianNaiveBayes::new(2);
        for i in 0..50 {
            let jitter = (i % 5) as f64 * 0.1;
            model.train(&Point::new(vec![0.0 + jitter, 0.0 - jitter], 0));
            model.train(&Point::new(vec![5.0 + jitter, 5.0 - jitter], 1));
        }
        assert!(model.correctly_classifies(&Point::new(vec![0.2, -0.1], 0)));
        assert!(model.correctly_classifies(&Point::new(vec![4.8, 5.1], 1)));
        let d = model.predict_distribution(&[0.0, 0.0]);
        assert!((d.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(d[0] > 0.99);
    }

    #[test]
    fn test_unseen_class_gets_zero() {
        let mut model = GaussianNaiveBayes::new(3);
        model.train(&Point::new(vec![1.0], 2));
        let d = model.predict_distribution(&[100.0]);
        assert_eq!(d, vec![0.0, 0.0, 1.0]);
        // Out of range labels are ignored.
        model.train(&Point::new(vec![1.0], 7));
        assert_eq!(model.n_trained(), 1.0);
    }

    #[test]
    fn test_factory() {
        let mut window = SlidingWindow::new(10);
        for i in 0..6 {
            window.push(Point::new(vec![i as f64], i % 2));
        }
        let seed = window.last().unwrap().clone();
        let factory = GaussianNaiveBayesFactory::new(2);
        let model = factory.build(&seed, &window).unwrap();
        assert!(model.correctly_classifies(&seed));

        let factory = factory.set_warm_start(4);
        let model = factory.build(&seed, &window).unwrap();
        let d = model.predict_distribution(&[2.0]);
        assert!(d[0] > 0.0 && d[1] > 0.0);

        let bad = Point::new(vec![0.0], 5);
        assert!(matches!(factory.build(&bad, &window), Err(DesDriftError::LabelOutOfRange(5, 2))));
    }
}
