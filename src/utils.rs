use crate::data::Point;
use std::cmp::Ordering;

/// Join names for error messages.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}

/// Index of the largest value, the lowest index wins ties.
/// NaN values are never selected over a number.
pub fn argmax(v: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, x) in v.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) => {
                if v[b].is_nan() && !x.is_nan() {
                    best = Some(i);
                } else if x.partial_cmp(&v[b]) == Some(Ordering::Greater) {
                    best = Some(i);
                }
            }
        }
    }
    best
}

/// Number of points per class. Labels past `n_classes` grow the vector.
pub fn class_counts<'a, I>(points: I, n_classes: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut counts = vec![0.0; n_classes];
    for p in points {
        if p.label >= counts.len() {
            counts.resize(p.label + 1, 0.0);
        }
        counts[p.label] += 1.0;
    }
    counts
}

/// Share of the neighborhood held by its most common class.
///
/// An empty neighborhood has homogeneity 0, so it never short-circuits.
pub fn homogeneity(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let maximum = counts.iter().cloned().fold(0.0, f64::max);
    maximum / total
}

pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Population standard deviation.
pub fn std_dev(v: &[f64]) -> f64 {
    let m = mean(v);
    let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / v.len() as f64;
    var.sqrt()
}
