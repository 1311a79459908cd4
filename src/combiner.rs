//! Combiners
//!
//! Turn the predictions of a selected sub-ensemble into one class score vector.
use crate::classifier::TrainableClassifier;
use crate::errors::DesDriftError;
use crate::utils::argmax;

pub trait Combiner {
    /// Combined scores for `features`, `classifiers` must not be empty.
    fn combine(&self, features: &[f64], classifiers: &[&dyn TrainableClassifier]) -> Result<Vec<f64>, DesDriftError>;
    /// Length of the score vectors it produces.
    fn n_classes(&self) -> usize;
}

/// Plain majority voting: every member votes for its arg-max class and the
/// vote shares are returned. A single member returns its own distribution.
#[derive(Debug, Clone, Default)]
pub struct MajorityVote {
    pub n_classes: usize,
}

impl MajorityVote {
    pub fn new(n_classes: usize) -> Self {
        MajorityVote { n_classes }
    }
}

impl Combiner for MajorityVote {
    fn combine(&self, features: &[f64], classifiers: &[&dyn TrainableClassifier]) -> Result<Vec<f64>, DesDriftError> {
        match classifiers {
            [] => Err(DesDriftError::Fatal("cannot combine an empty ensemble".to_string())),
            [single] => Ok(single.predict_distribution(features)),
            _ => {
                let mut votes = vec![0.0; self.n_classes];
                for c in classifiers {
                    if let Some(class) = argmax(&c.predict_distribution(features)) {
                        if class >= votes.len() {
                            votes.resize(class + 1, 0.0);
                        }
                        votes[class] += 1.0;
                    }
                }
                let n = classifiers.len() as f64;
                Ok(votes.into_iter().map(|v| v / n).collect())
            }
        }
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}
