use crate::errors::DesDriftError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Labeled feature vector, as seen by the index, the window and the learners.
///
/// A point is never mutated once it is stored, the index and the window each
/// keep their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Feature values, one per dimension.
    pub features: Vec<f64>,
    /// Class index, in `[0, n_classes)`.
    pub label: usize,
}

impl Point {
    pub fn new(features: Vec<f64>, label: usize) -> Self {
        Point { features, label }
    }

    /// Number of feature dimensions.
    pub fn n_dims(&self) -> usize {
        self.features.len()
    }

    /// Value at a single dimension.
    #[inline]
    pub fn value(&self, dim: usize) -> f64 {
        self.features[dim]
    }

    /// Full attribute equality: every feature and the label.
    ///
    /// Exact float comparison is intended, the index looks for the
    /// very point it was given earlier.
    pub fn same_as(&self, other: &Point) -> bool {
        self.label == other.label && self.features.len() == other.features.len() && self.features == other.features
    }

    /// Fail if the point does not carry exactly `n_dims` features.
    pub fn check_dims(&self, n_dims: usize) -> Result<(), DesDriftError> {
        check_dims(&self.features, n_dims)
    }

    /// Fail on NaN or infinite features, they could never be found again by exact search.
    pub fn check_finite(&self) -> Result<(), DesDriftError> {
        check_finite(&self.features)
    }

    /// Fail if the label is not below `n_classes`.
    pub fn check_label(&self, n_classes: usize) -> Result<(), DesDriftError> {
        if self.label >= n_classes {
            return Err(DesDriftError::LabelOutOfRange(self.label, n_classes));
        }
        Ok(())
    }
}

pub(crate) fn check_dims(features: &[f64], n_dims: usize) -> Result<(), DesDriftError> {
    if features.len() != n_dims {
        return Err(DesDriftError::DimensionMismatch(n_dims, features.len()));
    }
    Ok(())
}

pub(crate) fn check_finite(features: &[f64]) -> Result<(), DesDriftError> {
    match features.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(DesDriftError::NonFiniteFeature(i)),
        None => Ok(()),
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.features.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "|{})", self.label)
    }
}
