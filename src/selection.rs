//! Dynamic Selection
//!
//! Picks, per query, the pool members that are competent in the query's
//! neighborhood and combines only their votes.
use crate::classifier::{ClassifierPool, TrainableClassifier};
use crate::combiner::Combiner;
use crate::errors::DesDriftError;
use crate::index::Neighborhood;

pub trait DynamicSelector {
    /// Pool positions of the selected members, in pool order. Never empty for a non-empty pool.
    fn select(&self, pool: &ClassifierPool, neighborhood: &Neighborhood) -> Vec<usize>;

    /// Select, update the usage factors and combine the selection on `features`.
    fn classify(
        &self,
        pool: &mut ClassifierPool,
        neighborhood: &Neighborhood,
        features: &[f64],
        combiner: &dyn Combiner,
    ) -> Result<Vec<f64>, DesDriftError> {
        let selected = self.select(pool, neighborhood);
        let mut is_selected = vec![false; pool.len()];
        for &i in &selected {
            is_selected[i] = true;
        }
        for (handle, chosen) in pool.iter_mut().zip(is_selected) {
            if chosen {
                handle.increase_usage();
            } else {
                handle.decrease_usage();
            }
        }
        let members: Vec<&dyn TrainableClassifier> = selected
            .iter()
            .filter_map(|&i| pool.get(i))
            .map(|h| h.classifier())
            .collect();
        combiner.combine(features, &members)
    }
}

/// KNORA-Eliminate: keep the members that classify every neighbor correctly,
/// relaxing to the best achieved hit count when nobody does.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnoraEliminate {}

impl DynamicSelector for KnoraEliminate {
    fn select(&self, pool: &ClassifierPool, neighborhood: &Neighborhood) -> Vec<usize> {
        let n_neighbors = neighborhood.len();
        let hits: Vec<usize> = pool
            .iter()
            .map(|h| neighborhood.points().filter(|p| h.correctly_classifies(p)).count())
            .collect();

        let with_hits = |c: usize| -> Vec<usize> {
            hits.iter()
                .enumerate()
                .filter(|&(_, &h)| h == c)
                .map(|(i, _)| i)
                .collect()
        };

        let competent = with_hits(n_neighbors);
        if !competent.is_empty() {
            return competent;
        }
        for c in (1..n_neighbors).rev() {
            let relaxed = with_hits(c);
            if !relaxed.is_empty() {
                return relaxed;
            }
        }
        (0..pool.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::constant;
    use crate::classifier::ClassifierHandle;
    use crate::combiner::MajorityVote;
    use crate::data::Point;
    use crate::index::Neighbor;

    fn neighborhood(labels: &[usize]) -> Neighborhood {
        Neighborhood {
            neighbors: labels
                .iter()
                .map(|l| Neighbor {
                    point: Point::new(vec![0.0], *l),
                    distance: 0.0,
                })
                .collect(),
            nodes_visited: labels.len(),
        }
    }

    fn pool_of(classes: &[usize], n_classes: usize) -> ClassifierPool {
        let mut pool = ClassifierPool::new();
        for (i, c) in classes.iter().enumerate() {
            pool.push(ClassifierHandle::new(i as u64, i as u64, constant(*c, n_classes)));
        }
        pool
    }

    /// Predicts `below` under `cut` and `above` from it.
    struct Threshold {
        below: usize,
        above: usize,
        cut: f64,
    }

    impl TrainableClassifier for Threshold {
        fn train(&mut self, _point: &Point) {}
        fn predict_distribution(&self, features: &[f64]) -> Vec<f64> {
            let mut d = vec![0.0; 3];
            d[if features[0] < self.cut { self.below } else { self.above }] = 1.0;
            d
        }
    }

    #[test]
    fn test_single_competent_member_decides() {
        // Only the member predicting 1 is right on every neighbor.
        let mut pool = pool_of(&[0, 1, 2], 3);
        let hood = neighborhood(&[1, 1, 1]);
        let selector = KnoraEliminate::default();
        assert_eq!(selector.select(&pool, &hood), vec![1]);
        let d = selector
            .classify(&mut pool, &hood, &[0.0], &MajorityVote::new(3))
            .unwrap();
        assert_eq!(d, pool.get(1).unwrap().predict_distribution(&[0.0]));
        assert_eq!(pool.get(1).unwrap().usage_factor(), 1.0);
        assert_eq!(pool.get(0).unwrap().usage_factor(), -1.0);
    }

    #[test]
    fn test_relaxes_to_best_hit_count() {
        let pool = pool_of(&[0, 1, 2, 1], 3);
        // 2 hits for class 1, 1 hit for class 0, nobody is perfect
        let hood = neighborhood(&[1, 0, 1]);
        assert_eq!(KnoraEliminate::default().select(&pool, &hood), vec![1, 3]);
    }

    #[test]
    fn test_falls_back_to_whole_pool() {
        let pool = pool_of(&[0, 0], 3);
        let hood = neighborhood(&[2, 2]);
        assert_eq!(KnoraEliminate::default().select(&pool, &hood), vec![0, 1]);
        let empty = neighborhood(&[]);
        assert_eq!(KnoraEliminate::default().select(&pool, &empty), vec![0, 1]);
    }

    #[test]
    fn test_feature_dependent_competence() {
        let mut pool = ClassifierPool::new();
        pool.push(ClassifierHandle::new(
            0,
            0,
            Box::new(Threshold {
                below: 0,
                above: 1,
                cut: 0.5,
            }),
        ));
        pool.push(ClassifierHandle::new(1, 1, constant(0, 3)));
        let hood = Neighborhood {
            neighbors: vec![
                Neighbor {
                    point: Point::new(vec![0.0], 0),
                    distance: 0.0,
                },
                Neighbor {
                    point: Point::new(vec![1.0], 1),
                    distance: 1.0,
                },
            ],
            nodes_visited: 2,
        };
        let d = KnoraEliminate::default()
            .classify(&mut pool, &hood, &[0.9], &MajorityVote::new(3))
            .unwrap();
        assert_eq!(d, vec![0.0, 1.0, 0.0]);
    }
}
