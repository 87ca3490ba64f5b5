//! Likelihood evaluator contract.
//!
//! Purpose
//! -------
//! Define the seam between model assembly and the numerical backend that
//! solves the model and runs the Kalman filter. The assembly builds a
//! [`LikelihoodProblem`], hands it to a [`LikelihoodEvaluator`], and maps
//! the returned [`EvaluatorOutput`] to a scalar or an error.
//!
//! Key behaviors
//! -------------
//! - The problem owns everything built for this call (catalog, partition,
//!   structural inputs) and borrows the caller's parameter vector, observed
//!   indices and data.
//! - Evaluators report failures through `info`; they may also return an
//!   [`EstimationError`] directly (for example
//!   [`EstimationError::Evaluator`] for backend faults).
//! - Any `Fn(&LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput>`
//!   is an evaluator.
//!
//! Conventions
//! -----------
//! - `est_params` is forwarded without a length check; evaluators that need
//!   one call [`EstimatedParametersDescription::check_len`].
//! - `diffuse` is always `false`: only the stationary filter start is
//!   requested.
//!
//! [`EstimationError`]: crate::estimation::errors::EstimationError
//! [`EstimationError::Evaluator`]: crate::estimation::errors::EstimationError::Evaluator
use crate::estimation::{
    catalog::EstimatedParametersDescription,
    errors::EstimationResult,
    model::{config::SolverTolerances, partition::VariablePartition, structural::StructuralInputs},
};
use ndarray::{ArrayView1, ArrayView2};
use std::path::PathBuf;

/// Everything the evaluator needs for one likelihood evaluation.
#[derive(Debug, Clone)]
pub struct LikelihoodProblem<'a> {
    /// Path of the compiled dynamic model, `{fname}_dynamic{mexext}`.
    pub dynamic_artifact: PathBuf,
    pub catalog: EstimatedParametersDescription,
    pub endo_nbr: usize,
    pub exo_nbr: usize,
    pub partition: VariablePartition,
    pub tolerances: SolverTolerances,
    /// Observed-variable indices, 0-based, in data-row order.
    pub varobs: &'a [usize],
    pub structural: StructuralInputs,
    /// Candidate parameter vector in catalog order.
    pub est_params: ArrayView1<'a, f64>,
    /// Observations, `n_obs x n_periods`.
    pub data: ArrayView2<'a, f64>,
    pub diffuse: bool,
}

impl LikelihoodProblem<'_> {
    pub fn n_obs(&self) -> usize {
        self.varobs.len()
    }

    pub fn n_periods(&self) -> usize {
        self.data.ncols()
    }
}

/// Value and status returned by an evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorOutput {
    pub log_likelihood: f64,
    /// `0` on success, otherwise a status code (see
    /// [`describe_info`](crate::estimation::model::status::describe_info)).
    pub info: i32,
}

impl EvaluatorOutput {
    pub fn success(log_likelihood: f64) -> Self {
        EvaluatorOutput { log_likelihood, info: 0 }
    }

    pub fn failure(info: i32) -> Self {
        EvaluatorOutput { log_likelihood: f64::NAN, info }
    }
}

/// Numerical backend computing the log-likelihood of a [`LikelihoodProblem`].
pub trait LikelihoodEvaluator {
    /// # Errors
    /// Backend-specific; non-convergence should be reported through
    /// [`EvaluatorOutput::info`] rather than an error.
    fn compute(&self, problem: &LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput>;
}

impl<F> LikelihoodEvaluator for F
where
    F: Fn(&LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput>,
{
    fn compute(&self, problem: &LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput> {
        self(problem)
    }
}
