//! Distance metrics
//!
//! The index is metric-agnostic, each metric brings a distance and the bound
//! used to decide whether the far side of a split may still hold a closer point.
use crate::errors::DesDriftError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type DistanceFn = fn(&[f64], &[f64]) -> f64;
pub type BoundFn = fn(f64, f64) -> f64;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    Canberra,
}

impl FromStr for Metric {
    type Err = DesDriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Euclidean" => Ok(Metric::Euclidean),
            "Canberra" => Ok(Metric::Canberra),
            _ => Err(DesDriftError::ParseString(
                s.to_string(),
                "Metric".to_string(),
                items_to_strings(vec!["Euclidean", "Canberra"]),
            )),
        }
    }
}

/// Returns the search distance and the split-plane bound for a metric.
pub fn metric_callables(metric: &Metric) -> (DistanceFn, BoundFn) {
    match metric {
        Metric::Euclidean => (Euclidean::search_distance, Euclidean::plane_bound),
        Metric::Canberra => (Canberra::search_distance, Canberra::plane_bound),
    }
}

pub trait DistanceMetric {
    /// Distance used to rank candidates during a search. It only has to be
    /// order-preserving with respect to the reported distance.
    fn search_distance(a: &[f64], b: &[f64]) -> f64;
    /// Lower bound, on the search scale, for any point on the other side of
    /// a split with value `split` along the dimension where the target has `target`.
    fn plane_bound(target: f64, split: f64) -> f64;
    /// Convert a search distance to the distance reported to callers.
    fn report(search_distance: f64) -> f64;
}

pub struct Euclidean {}

impl DistanceMetric for Euclidean {
    /// Squared euclidean distance, so the plane bound is exact.
    #[inline]
    fn search_distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[inline]
    fn plane_bound(target: f64, split: f64) -> f64 {
        (target - split) * (target - split)
    }

    fn report(search_distance: f64) -> f64 {
        search_distance.sqrt()
    }
}

pub struct Canberra {}

impl DistanceMetric for Canberra {
    #[inline]
    fn search_distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| canberra_term(*x, *y)).sum()
    }

    #[inline]
    fn plane_bound(target: f64, split: f64) -> f64 {
        canberra_term(target, split)
    }

    fn report(search_distance: f64) -> f64 {
        search_distance
    }
}

/// `|x - y| / (|x| + |y|)`, zero when both are zero.
#[inline]
fn canberra_term(x: f64, y: f64) -> f64 {
    let denominator = x.abs() + y.abs();
    if denominator == 0.0 {
        0.0
    } else {
        (x - y).abs() / denominator
    }
}

/// Reported distance between two feature vectors under a metric.
pub fn distance(metric: &Metric, a: &[f64], b: &[f64]) -> f64 {
    match metric {
        Metric::Euclidean => Euclidean::report(Euclidean::search_distance(a, b)),
        Metric::Canberra => Canberra::report(Canberra::search_distance(a, b)),
    }
}

/// Convert a search distance produced by `metric_callables` to a reported one.
pub fn report_distance(metric: &Metric, search_distance: f64) -> f64 {
    match metric {
        Metric::Euclidean => Euclidean::report(search_distance),
        Metric::Canberra => Canberra::report(search_distance),
    }
}
