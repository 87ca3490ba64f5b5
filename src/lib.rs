//! dsge_estimation — likelihood evaluation glue for DSGE model estimation.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the likelihood entry point to Python via the `_dsge_estimation`
//! extension module. The crate turns estimated-parameter tables and a model
//! description into the validated inputs of an external likelihood
//! evaluator, calls it, and reports its answer.
//!
//! Key behaviors
//! -------------
//! - Re-export the core [`estimation`] module as the public crate surface.
//! - With `python-bindings`, define the `loglikelihood` and `describe_info`
//!   Python functions and the `#[pymodule]` initializer.
//!
//! Invariants & assumptions
//! ------------------------
//! - All validation and assembly live in [`estimation`]; this file performs
//!   only FFI glue and error mapping.
//! - The Python evaluator is called with the GIL held and must not assume it
//!   is called from any particular thread.
//!
//! Conventions
//! -----------
//! - Python environment objects mirror the estimation toolchain globals:
//!   `M_`, `options_`, `estim_params_`, `oo_`. Dicts and attribute objects
//!   are both accepted.
//! - Errors from Rust code are [`estimation::EstimationError`] internally
//!   and `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code depends on [`estimation`] and supplies its own
//!   [`estimation::LikelihoodEvaluator`].
//! - Python code calls `_dsge_estimation.loglikelihood(...)` with a callable
//!   evaluator.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_loglikelihood_pipeline.rs`.

pub mod estimation;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    estimation::{errors::EstimationError, model::status},
    utils::{PyEvaluator, extract_config, extract_matrix, extract_vector},
};

/// loglikelihood — Python entry point for one likelihood evaluation.
///
/// Parameters
/// ----------
/// - `est_params`: 1-D array-like, candidate vector in catalog order.
/// - `data`: 2-D array-like, `n_obs x n_periods`.
/// - `mexext`: extension of the compiled dynamic model.
/// - `model`, `options`, `estim_params`, `oo`: environment objects read by
///   named field (see [`utils::extract_config`]).
/// - `evaluator`: callable receiving the problem dict, returning
///   `(loglik, info)`.
///
/// Errors
/// ------
/// - `ValueError` for any [`EstimationError`], including missing fields and
///   evaluator failures.
/// - `TypeError` if `evaluator` is not callable.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "loglikelihood")]
#[pyo3(
    signature = (est_params, data, mexext, model, options, estim_params, oo, evaluator),
    text_signature = "(est_params, data, mexext, model, options, estim_params, oo, evaluator, /)"
)]
#[allow(clippy::too_many_arguments)]
fn py_loglikelihood<'py>(
    est_params: &Bound<'py, PyAny>, data: &Bound<'py, PyAny>, mexext: &str,
    model: &Bound<'py, PyAny>, options: &Bound<'py, PyAny>, estim_params: &Bound<'py, PyAny>,
    oo: &Bound<'py, PyAny>, evaluator: &Bound<'py, PyAny>,
) -> PyResult<f64> {
    let evaluator = PyEvaluator::new(evaluator)?;
    let config = extract_config(model, options, estim_params, oo)?;
    let theta = extract_vector(est_params).map_err(|reason| EstimationError::UnreadableField {
        object: "arguments".to_owned(),
        field: "est_params".to_owned(),
        reason,
    })?;
    let data = extract_matrix(data).map_err(|reason| EstimationError::UnreadableField {
        object: "arguments".to_owned(),
        field: "data".to_owned(),
        reason,
    })?;

    let ll = estimation::loglikelihood(theta.view(), data.view(), mexext, &config, &evaluator)?;
    Ok(ll)
}

/// Message for an evaluator status code.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "describe_info")]
fn py_describe_info(info: i32) -> &'static str {
    status::describe_info(info)
}

/// _dsge_estimation — PyO3 module initializer for the Python extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _dsge_estimation<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_loglikelihood, m)?)?;
    m.add_function(wrap_pyfunction!(py_describe_info, m)?)?;
    Ok(())
}
