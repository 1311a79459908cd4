//! Evaluation
//!
//! Prequential (test then train) evaluation of an `EnsembleController` over a
//! labeled stream, single or repeated in parallel.
use crate::data::Point;
use crate::ensemble::EnsembleController;
use crate::errors::DesDriftError;
use crate::utils::{mean, precision_round, std_dev};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of one prequential run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Percentage of correctly classified tested points, NaN when nothing was tested.
    pub accuracy: f64,
    pub n_samples: usize,
    /// Whether each tested point was classified correctly, in stream order.
    pub correct: Vec<bool>,
    pub n_rebuilds: usize,
    pub n_drifts: usize,
    pub elapsed_seconds: f64,
}

/// Aggregate of repeated runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub n_runs: usize,
    pub mean_accuracy: f64,
    /// Population standard deviation of the run accuracies.
    pub sd_accuracy: f64,
    pub mean_rebuilds: f64,
    pub mean_drifts: f64,
    pub mean_seconds: f64,
    pub runs: Vec<EvaluationReport>,
}

/// Train on the first `n_pretrain` points, then test and train on each of the others.
pub fn prequential(
    controller: &mut EnsembleController,
    points: &[Point],
    n_pretrain: usize,
) -> Result<EvaluationReport, DesDriftError> {
    let n_pretrain = n_pretrain.min(points.len());
    for point in &points[..n_pretrain] {
        controller.train(point.clone())?;
    }

    let start = Instant::now();
    let mut correct = Vec::with_capacity(points.len() - n_pretrain);
    for point in &points[n_pretrain..] {
        let class = controller.predict_class(&point.features)?;
        correct.push(class == point.label);
        controller.train(point.clone())?;
    }
    let elapsed_seconds = start.elapsed().as_secs_f64();

    let n_samples = correct.len();
    let n_correct = correct.iter().filter(|&&c| c).count();
    let accuracy = 100.0 * n_correct as f64 / n_samples as f64;
    info!(
        "Prequential accuracy {}% over {} samples, {} rebuilds, {} drifts, {}s.",
        precision_round(accuracy, 2),
        n_samples,
        controller.n_rebuilds(),
        controller.n_drifts_detected(),
        precision_round(elapsed_seconds, 3)
    );
    Ok(EvaluationReport {
        accuracy,
        n_samples,
        correct,
        n_rebuilds: controller.n_rebuilds(),
        n_drifts: controller.n_drifts_detected(),
        elapsed_seconds,
    })
}

/// Run `n_runs` independent prequential evaluations in parallel.
///
/// * `make_controller` - Called with the run seed, `1..=n_runs`.
pub fn repeated_prequential<F>(
    n_runs: usize,
    make_controller: F,
    points: &[Point],
    n_pretrain: usize,
) -> Result<EvaluationSummary, DesDriftError>
where
    F: Fn(u64) -> Result<EnsembleController, DesDriftError> + Sync,
{
    if n_runs < 1 {
        return Err(DesDriftError::InvalidConfiguration(
            "n_runs".to_string(),
            "at least 1".to_string(),
            n_runs.to_string(),
        ));
    }
    let runs = (1..=n_runs as u64)
        .into_par_iter()
        .map(|seed| {
            let mut controller = make_controller(seed)?;
            prequential(&mut controller, points, n_pretrain)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let accuracies: Vec<f64> = runs.iter().map(|r| r.accuracy).collect();
    let rebuilds: Vec<f64> = runs.iter().map(|r| r.n_rebuilds as f64).collect();
    let drifts: Vec<f64> = runs.iter().map(|r| r.n_drifts as f64).collect();
    let seconds: Vec<f64> = runs.iter().map(|r| r.elapsed_seconds).collect();
    Ok(EvaluationSummary {
        n_runs,
        mean_accuracy: mean(&accuracies),
        sd_accuracy: std_dev(&accuracies),
        mean_rebuilds: mean(&rebuilds),
        mean_drifts: mean(&drifts),
        mean_seconds: mean(&seconds),
        runs,
    })
}
