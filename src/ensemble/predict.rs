use crate::ensemble::core::EnsembleController;
use crate::errors::DesDriftError;
use crate::index::NeighborIndex;
use crate::utils::{argmax, class_counts, homogeneity};
use rand::Rng;

impl EnsembleController {
    /// Class vote vector for `features`.
    ///
    /// A stale index is rebuilt first. Without any pool member the answer is a
    /// random one-hot vector. A neighborhood made of a single class answers
    /// with its class counts, otherwise the competent members vote.
    pub fn predict(&mut self, features: &[f64]) -> Result<Vec<f64>, DesDriftError> {
        if !self.state.is_cold() && !self.state.index_ready() {
            self.rebuild("stale")?;
        }
        if self.pool.is_empty() {
            return Ok(self.placeholder());
        }

        let neighborhood = self.index.k_nearest(features, self.cfg.n_neighbors)?;
        let counts = class_counts(neighborhood.points(), self.cfg.n_classes);
        if homogeneity(&counts) == 1.0 {
            return Ok(counts);
        }
        self.selector
            .classify(&mut self.pool, &neighborhood, features, self.combiner.as_ref())
    }

    /// Most voted class, the lowest class wins ties.
    pub fn predict_class(&mut self, features: &[f64]) -> Result<usize, DesDriftError> {
        let votes = self.predict(features)?;
        argmax(&votes).ok_or_else(|| DesDriftError::Fatal("empty vote vector".to_string()))
    }

    fn placeholder(&mut self) -> Vec<f64> {
        let mut votes = vec![0.0; self.cfg.n_classes];
        let class = self.rng.gen_range(0..self.cfg.n_classes);
        votes[class] = 1.0;
        votes
    }
}

#[cfg(test)]
mod tests {
    use crate::data::Point;
    use crate::drift::Ddm;
    use crate::ensemble::config::EnsembleConfig;
    use crate::ensemble::core::tests::controller;
    use crate::ensemble::core::EnsembleController;
    use crate::errors::DesDriftError;
    use crate::metric::Metric;

    fn scenario(n_neighbors: usize) -> EnsembleController {
        let cfg = EnsembleConfig::new(2)
            .set_metric(Metric::Euclidean)
            .set_n_neighbors(n_neighbors)
            .set_warm_up(1_000)
            .set_training_batch_size(1_000);
        let mut c = controller(cfg, Box::new(Ddm::default()));
        let (a, b) = (0, 1);
        for (x, y, label) in [(0.0, 0.0, a), (1.0, 0.0, b), (0.0, 1.0, a), (5.0, 5.0, b), (5.0, 4.0, b)] {
            c.train(Point::new(vec![x, y], label)).unwrap();
        }
        c
    }

    #[test]
    fn test_mixed_neighborhood_uses_the_pool() {
        let mut c = scenario(3);
        assert_eq!(c.n_rebuilds(), 0);
        // Neighbors are A, B, A. The only member always says B, the raw
        // counts would have been [2, 1].
        let votes = c.predict(&[0.0, 0.0]).unwrap();
        assert_eq!(votes, vec![0.0, 1.0]);
        assert_eq!(c.n_rebuilds(), 1);
        assert_eq!(c.pool().get(0).map(|h| h.usage_factor()), Some(1.0));
    }

    #[test]
    fn test_pure_neighborhood_short_circuits() {
        let mut c = scenario(2);
        let votes = c.predict(&[5.0, 5.0]).unwrap();
        assert_eq!(votes, vec![0.0, 2.0]);
        assert_eq!(c.pool().get(0).map(|h| h.usage_factor()), Some(0.0));
        assert_eq!(c.predict_class(&[0.0, 0.5]).unwrap(), 0);
    }

    #[test]
    fn test_placeholder_before_training() {
        let cfg = EnsembleConfig::new(4).set_seed(7);
        let mut first = EnsembleController::with_defaults(cfg.clone()).unwrap();
        let mut second = EnsembleController::with_defaults(cfg).unwrap();
        for _ in 0..10 {
            let votes = first.predict(&[1.0, 2.0]).unwrap();
            assert_eq!(votes.len(), 4);
            assert_eq!(votes.iter().sum::<f64>(), 1.0);
            assert_eq!(votes.iter().filter(|&&v| v == 1.0).count(), 1);
            assert_eq!(votes, second.predict(&[1.0, 2.0]).unwrap());
        }
        assert_eq!(first.n_rebuilds(), 0);
    }

    #[test]
    fn test_query_dimension_checked() {
        let mut c = scenario(3);
        assert!(matches!(
            c.predict(&[0.0, 0.0, 0.0]),
            Err(DesDriftError::DimensionMismatch(2, 3))
        ));
    }
}
