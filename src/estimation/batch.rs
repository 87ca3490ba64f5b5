//! Rayon-based parallel evaluation of many likelihood calls.
//!
//! Each evaluation is independent: it builds its own catalog, partition and
//! structural inputs, so calls share nothing but read-only configuration.
//! Results keep the input order.

use rayon::prelude::*;
use tracing::debug;

use crate::estimation::{
    errors::EstimationResult,
    model::{EstimationConfig, LikelihoodEvaluator, loglikelihood},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Log-likelihood of several candidate parameter vectors on the same data.
///
/// `results[i]` is the outcome for `candidates[i]`; one failing candidate
/// does not affect the others.
pub fn batch_loglikelihood<E>(
    candidates: &[Array1<f64>], data: ArrayView2<'_, f64>, mexext: &str,
    config: &EstimationConfig, evaluator: &E,
) -> Vec<EstimationResult<f64>>
where
    E: LikelihoodEvaluator + Sync + ?Sized,
{
    debug!(n_candidates = candidates.len(), "batch log-likelihood over candidates");
    candidates
        .par_iter()
        .map(|theta| loglikelihood(theta.view(), data, mexext, config, evaluator))
        .collect()
}

/// Log-likelihood of one parameter vector on several datasets.
///
/// All datasets share the configuration; each may have its own sample length.
pub fn batch_loglikelihood_datasets<E>(
    est_params: ArrayView1<'_, f64>, datasets: &[Array2<f64>], mexext: &str,
    config: &EstimationConfig, evaluator: &E,
) -> Vec<EstimationResult<f64>>
where
    E: LikelihoodEvaluator + Sync + ?Sized,
{
    debug!(n_datasets = datasets.len(), "batch log-likelihood over datasets");
    datasets
        .par_iter()
        .map(|data| loglikelihood(est_params, data.view(), mexext, config, evaluator))
        .collect()
}
