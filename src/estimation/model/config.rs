//! Explicit estimation configuration — model, options, tables, and results.
//!
//! Purpose
//! -------
//! Carry everything the likelihood pipeline reads from its environment as
//! plain, validated structs passed into the evaluation call:
//! [`ModelDescription`] (model dimensions and structural matrices),
//! [`EstimationOptions`] (solver tolerances and observed variables),
//! [`EstimatedParamsTables`] (which parameters are estimated), and
//! [`EstimationResults`] (steady state).
//!
//! Key behaviors
//! -------------
//! - Each component validates its own fields in `new`; [`EstimationConfig::new`]
//!   adds the cross-field checks (steady-state length, observed-variable
//!   range, H dimension, table widths).
//! - A successfully built [`EstimationConfig`] can be reused across many
//!   evaluations; nothing in it is mutated by the pipeline.
//!
//! Invariants & assumptions
//! ------------------------
//! - `params.len() == param_nbr`, `sigma_e` is `exo_nbr x exo_nbr`.
//! - `lead_lag_incidence` is `3 x endo_nbr`.
//! - `varobs` holds 0-based indices `< endo_nbr`.
//! - `h` is either the `1 x 1` zero shorthand or `n_obs x n_obs`.
//! - Solver tolerances are finite and strictly positive.
//!
//! Conventions
//! -----------
//! - Field names follow the estimation toolchain (`fname`, `endo_nbr`,
//!   `Sigma_e` as `sigma_e`, `varobs_id` as `varobs`, ...).
//! - `varobs_id` is supplied 1-based as a `1 x n_obs` row and stored
//!   0-based.
use crate::estimation::{
    catalog::EstimatedParamsTables,
    errors::{EstimationError, EstimationResult},
    model::partition::check_incidence_shape,
};
use ndarray::{Array1, Array2, ArrayView2};

/// ModelDescription — dimensions and structural matrices of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescription {
    /// Model base name; the dynamic artifact is `{fname}_dynamic{ext}`.
    pub fname: String,
    pub endo_nbr: usize,
    pub exo_nbr: usize,
    pub param_nbr: usize,
    /// `3 x endo_nbr` lag / current / lead incidence rows.
    pub lead_lag_incidence: Array2<f64>,
    /// Deep-parameter values (`param_nbr`).
    pub params: Array1<f64>,
    /// Shock covariance (`exo_nbr x exo_nbr`).
    pub sigma_e: Array2<f64>,
    /// Measurement-error covariance, or the `1 x 1` zero shorthand.
    pub h: Array2<f64>,
}

impl ModelDescription {
    /// Build a validated model description.
    ///
    /// Errors
    /// ------
    /// - [`EstimationError::IncidenceShape`] if the incidence matrix is not
    ///   `3 x endo_nbr`.
    /// - [`EstimationError::LengthMismatch`] if `params.len() != param_nbr`.
    /// - [`EstimationError::MatrixShape`] if `sigma_e` is not
    ///   `exo_nbr x exo_nbr`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fname: impl Into<String>, endo_nbr: usize, exo_nbr: usize, param_nbr: usize,
        lead_lag_incidence: Array2<f64>, params: Array1<f64>, sigma_e: Array2<f64>,
        h: Array2<f64>,
    ) -> EstimationResult<Self> {
        check_incidence_shape(lead_lag_incidence.view(), endo_nbr)?;
        if params.len() != param_nbr {
            return Err(EstimationError::LengthMismatch {
                field: "params",
                expected: param_nbr,
                actual: params.len(),
            });
        }
        check_square("Sigma_e", sigma_e.view(), exo_nbr)?;
        Ok(ModelDescription {
            fname: fname.into(),
            endo_nbr,
            exo_nbr,
            param_nbr,
            lead_lag_incidence,
            params,
            sigma_e,
            h,
        })
    }
}

/// Tolerances forwarded to the model solver and filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverTolerances {
    /// Threshold separating stable from unstable generalized eigenvalues.
    pub qz_criterium: f64,
    /// Threshold below which complex parts are ignored in the Lyapunov solve.
    pub lyapunov_complex_threshold: f64,
    /// Convergence tolerance of the Riccati iteration.
    pub riccati_tol: f64,
}

impl SolverTolerances {
    /// # Errors
    /// [`EstimationError::InvalidTolerance`] naming the first field that is
    /// non-finite or `<= 0`.
    pub fn new(
        qz_criterium: f64, lyapunov_complex_threshold: f64, riccati_tol: f64,
    ) -> EstimationResult<Self> {
        check_tolerance("qz_criterium", qz_criterium)?;
        check_tolerance("lyapunov_complex_threshold", lyapunov_complex_threshold)?;
        check_tolerance("riccati_tol", riccati_tol)?;
        Ok(SolverTolerances { qz_criterium, lyapunov_complex_threshold, riccati_tol })
    }
}

impl Default for SolverTolerances {
    fn default() -> Self {
        SolverTolerances {
            qz_criterium: 1.0 + 1e-6,
            lyapunov_complex_threshold: 1e-15,
            riccati_tol: 1e-6,
        }
    }
}

/// EstimationOptions — solver tolerances and observed variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationOptions {
    pub tolerances: SolverTolerances,
    varobs: Vec<usize>,
}

impl EstimationOptions {
    /// Build options from tolerances and the raw `varobs_id` row.
    ///
    /// Parameters
    /// ----------
    /// - `tolerances`: validated [`SolverTolerances`].
    /// - `varobs_id`: `1 x n_obs` array of 1-based endogenous indices.
    ///
    /// Errors
    /// ------
    /// - [`EstimationError::VarobsNotRowVector`] if `varobs_id` has more or
    ///   fewer than one row.
    /// - [`EstimationError::InvalidVarobsIndex`] for non-integral or
    ///   non-positive entries (`endo_nbr` is reported as 0 here; the range
    ///   check against the model happens in [`EstimationConfig::new`]).
    pub fn new(tolerances: SolverTolerances, varobs_id: ArrayView2<'_, f64>) -> EstimationResult<Self> {
        let varobs = parse_varobs(varobs_id)?;
        Ok(EstimationOptions { tolerances, varobs })
    }

    /// Observed-variable indices, 0-based, in data-row order.
    pub fn varobs(&self) -> &[usize] {
        &self.varobs
    }

    pub fn n_varobs(&self) -> usize {
        self.varobs.len()
    }
}

/// Convert the 1-based `varobs_id` row into 0-based indices.
///
/// # Errors
/// See [`EstimationOptions::new`].
pub fn parse_varobs(varobs_id: ArrayView2<'_, f64>) -> EstimationResult<Vec<usize>> {
    if varobs_id.nrows() != 1 {
        return Err(EstimationError::VarobsNotRowVector { rows: varobs_id.nrows() });
    }
    varobs_id
        .row(0)
        .iter()
        .enumerate()
        .map(|(position, &value)| {
            if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
                return Err(EstimationError::InvalidVarobsIndex { position, value, endo_nbr: 0 });
            }
            Ok(value as usize - 1)
        })
        .collect()
}

/// EstimationResults — quantities computed before estimation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResults {
    /// Steady state of the endogenous variables (`endo_nbr`).
    pub steady_state: Array1<f64>,
}

impl EstimationResults {
    pub fn new(steady_state: Array1<f64>) -> Self {
        EstimationResults { steady_state }
    }
}

/// EstimationConfig — the full environment of one estimation run.
///
/// Invariants
/// ----------
/// - All component invariants hold.
/// - `results.steady_state.len() == model.endo_nbr`.
/// - Every observed index is `< model.endo_nbr`.
/// - `model.h` is `1 x 1` zero or `n_obs x n_obs`.
/// - Every table in `estim_params` has the column count of its type.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationConfig {
    pub model: ModelDescription,
    pub options: EstimationOptions,
    pub estim_params: EstimatedParamsTables,
    pub results: EstimationResults,
}

impl EstimationConfig {
    /// Bundle the components and run the cross-field checks.
    ///
    /// Errors
    /// ------
    /// - [`EstimationError::LengthMismatch`] for the steady state.
    /// - [`EstimationError::InvalidVarobsIndex`] for observed indices beyond
    ///   `endo_nbr`.
    /// - [`EstimationError::MatrixShape`] for a mis-sized `H`.
    /// - [`EstimationError::TableColumnMismatch`] for malformed tables.
    pub fn new(
        model: ModelDescription, options: EstimationOptions, estim_params: EstimatedParamsTables,
        results: EstimationResults,
    ) -> EstimationResult<Self> {
        if results.steady_state.len() != model.endo_nbr {
            return Err(EstimationError::LengthMismatch {
                field: "steady_state",
                expected: model.endo_nbr,
                actual: results.steady_state.len(),
            });
        }
        if let Some((position, &index)) =
            options.varobs().iter().enumerate().find(|(_, &i)| i >= model.endo_nbr)
        {
            return Err(EstimationError::InvalidVarobsIndex {
                position,
                value: (index + 1) as f64,
                endo_nbr: model.endo_nbr,
            });
        }
        if !is_zero_shorthand(model.h.view()) {
            check_square("H", model.h.view(), options.n_varobs())?;
        }
        estim_params.validate()?;
        Ok(EstimationConfig { model, options, estim_params, results })
    }
}

/// `true` for the `1 x 1` zero matrix meaning "no measurement error".
pub fn is_zero_shorthand(h: ArrayView2<'_, f64>) -> bool {
    h.dim() == (1, 1) && h[[0, 0]] == 0.0
}

pub(crate) fn check_square(field: &'static str, m: ArrayView2<'_, f64>, n: usize) -> EstimationResult<()> {
    if m.dim() != (n, n) {
        return Err(EstimationError::MatrixShape { field, expected: (n, n), actual: m.dim() });
    }
    Ok(())
}

fn check_tolerance(field: &'static str, value: f64) -> EstimationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EstimationError::InvalidTolerance { field, value });
    }
    Ok(())
}
