//! utils — PyO3 conversion helpers for the Python boundary.
//!
//! Purpose
//! -------
//! Read the estimation environment (`M_`, `options_`, `estim_params_`,
//! `oo_`) from Python objects by named field, convert them into the
//! validated Rust configuration, and wrap a Python callable as a
//! [`LikelihoodEvaluator`].
//!
//! Key behaviors
//! -------------
//! - Fields are looked up by key on dicts and by attribute on any other
//!   object; an absent field is [`EstimationError::MissingField`], a field of
//!   the wrong type is [`EstimationError::UnreadableField`].
//! - Matrices accept 2-D arrays, 1-D arrays (read as a single row), scalars
//!   (read as `1 x 1`), and nested sequences.
//! - The evaluator bundle is passed to Python as a dict of numpy arrays,
//!   lists and scalars; the callable returns `(loglik, info)`.
//! - The parameter catalog travels as a list of plain dicts, one per
//!   coordinate of `est_params`, in catalog order.
//!
//! Conventions
//! -----------
//! - Everything here is compiled only with the `python-bindings` feature.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2, ToPyArray};

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict, PyList},
};

#[cfg(feature = "python-bindings")]
use crate::estimation::{
    catalog::{EstimatedParametersDescription, EstimatedParamsTables},
    errors::{EstimationError, EstimationResult},
    model::{
        EstimationConfig, EstimationOptions, EstimationResults, EvaluatorOutput,
        LikelihoodEvaluator, LikelihoodProblem, ModelDescription, SolverTolerances,
    },
};

/// Look up `field` on `obj`: dict key first, attribute otherwise.
#[cfg(feature = "python-bindings")]
pub fn get_field<'py>(
    obj: &Bound<'py, PyAny>, object: &str, field: &str,
) -> EstimationResult<Bound<'py, PyAny>> {
    let missing = || EstimationError::MissingField {
        object: object.to_owned(),
        field: field.to_owned(),
    };
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return dict
            .get_item(field)
            .map_err(|e| unreadable(object, field, e.to_string()))?
            .ok_or_else(missing);
    }
    obj.getattr(field).map_err(|_| missing())
}

#[cfg(feature = "python-bindings")]
fn unreadable(object: &str, field: &str, reason: impl Into<String>) -> EstimationError {
    EstimationError::UnreadableField {
        object: object.to_owned(),
        field: field.to_owned(),
        reason: reason.into(),
    }
}

#[cfg(feature = "python-bindings")]
pub fn extract_f64_field(obj: &Bound<'_, PyAny>, object: &str, field: &str) -> EstimationResult<f64> {
    get_field(obj, object, field)?
        .extract::<f64>()
        .map_err(|e| unreadable(object, field, e.to_string()))
}

/// Non-negative integer field; floats are accepted when integral.
#[cfg(feature = "python-bindings")]
pub fn extract_usize_field(
    obj: &Bound<'_, PyAny>, object: &str, field: &str,
) -> EstimationResult<usize> {
    let value = get_field(obj, object, field)?;
    if let Ok(n) = value.extract::<usize>() {
        return Ok(n);
    }
    let x = value.extract::<f64>().map_err(|e| unreadable(object, field, e.to_string()))?;
    if x.is_finite() && x >= 0.0 && x.fract() == 0.0 {
        Ok(x as usize)
    } else {
        Err(unreadable(object, field, format!("expected a non-negative integer, got {x}")))
    }
}

#[cfg(feature = "python-bindings")]
pub fn extract_string_field(
    obj: &Bound<'_, PyAny>, object: &str, field: &str,
) -> EstimationResult<String> {
    get_field(obj, object, field)?
        .extract::<String>()
        .map_err(|e| unreadable(object, field, e.to_string()))
}

/// Read a matrix-like Python value as an owned `Array2<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_matrix(value: &Bound<'_, PyAny>) -> Result<Array2<f64>, String> {
    if let Ok(arr) = value.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(arr) = value.extract::<PyReadonlyArray1<f64>>() {
        let row = arr.as_array().to_owned();
        let n = row.len();
        return row.into_shape_with_order((1, n)).map_err(|e| e.to_string());
    }
    if let Ok(x) = value.extract::<f64>() {
        return Ok(Array2::from_elem((1, 1), x));
    }
    let rows: Vec<Vec<f64>> = value
        .extract()
        .map_err(|_| "expected a 2-D float64 array, scalar, or nested sequence".to_owned())?;
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err("nested sequence rows have different lengths".to_owned());
    }
    Array2::from_shape_vec((n_rows, n_cols), rows.into_iter().flatten().collect())
        .map_err(|e| e.to_string())
}

/// Read a vector-like Python value; `1 x n` and `n x 1` matrices are flattened.
#[cfg(feature = "python-bindings")]
pub fn extract_vector(value: &Bound<'_, PyAny>) -> Result<Array1<f64>, String> {
    if let Ok(arr) = value.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(v) = value.extract::<Vec<f64>>() {
        return Ok(Array1::from(v));
    }
    let m = extract_matrix(value)?;
    if m.nrows() == 1 || m.ncols() == 1 {
        Ok(m.iter().copied().collect())
    } else {
        Err(format!("expected a vector, got a {} x {} matrix", m.nrows(), m.ncols()))
    }
}

#[cfg(feature = "python-bindings")]
pub fn extract_matrix_field(
    obj: &Bound<'_, PyAny>, object: &str, field: &str,
) -> EstimationResult<Array2<f64>> {
    extract_matrix(&get_field(obj, object, field)?).map_err(|r| unreadable(object, field, r))
}

#[cfg(feature = "python-bindings")]
pub fn extract_vector_field(
    obj: &Bound<'_, PyAny>, object: &str, field: &str,
) -> EstimationResult<Array1<f64>> {
    extract_vector(&get_field(obj, object, field)?).map_err(|r| unreadable(object, field, r))
}

/// Build the validated configuration from the four environment objects.
///
/// Field names:
/// - `M_`: `fname`, `endo_nbr`, `exo_nbr`, `param_nbr`,
///   `lead_lag_incidence`, `params`, `Sigma_e`, `H`.
/// - `options_`: `qz_criterium`, `lyapunov_complex_threshold`,
///   `riccati_tol`, `varobs_id`.
/// - `estim_params_`: `var_exo`, `var_endo`, `corrx`, `corrn`, `param_vals`.
/// - `oo_`: `steady_state`.
#[cfg(feature = "python-bindings")]
pub fn extract_config(
    model: &Bound<'_, PyAny>, options: &Bound<'_, PyAny>, estim_params: &Bound<'_, PyAny>,
    oo: &Bound<'_, PyAny>,
) -> EstimationResult<EstimationConfig> {
    let model = ModelDescription::new(
        extract_string_field(model, "M_", "fname")?,
        extract_usize_field(model, "M_", "endo_nbr")?,
        extract_usize_field(model, "M_", "exo_nbr")?,
        extract_usize_field(model, "M_", "param_nbr")?,
        extract_matrix_field(model, "M_", "lead_lag_incidence")?,
        extract_vector_field(model, "M_", "params")?,
        extract_matrix_field(model, "M_", "Sigma_e")?,
        extract_matrix_field(model, "M_", "H")?,
    )?;

    let tolerances = SolverTolerances::new(
        extract_f64_field(options, "options_", "qz_criterium")?,
        extract_f64_field(options, "options_", "lyapunov_complex_threshold")?,
        extract_f64_field(options, "options_", "riccati_tol")?,
    )?;
    let varobs_id = extract_matrix_field(options, "options_", "varobs_id")?;
    let options = EstimationOptions::new(tolerances, varobs_id.view())?;

    let tables = EstimatedParamsTables {
        var_exo: extract_matrix_field(estim_params, "estim_params_", "var_exo")?,
        var_endo: extract_matrix_field(estim_params, "estim_params_", "var_endo")?,
        corrx: extract_matrix_field(estim_params, "estim_params_", "corrx")?,
        corrn: extract_matrix_field(estim_params, "estim_params_", "corrn")?,
        param_vals: extract_matrix_field(estim_params, "estim_params_", "param_vals")?,
    };

    let results = EstimationResults::new(extract_vector_field(oo, "oo_", "steady_state")?);

    EstimationConfig::new(model, options, tables, results)
}

/// PyEvaluator — a Python callable used as the likelihood backend.
///
/// The callable receives one dict (see [`PyEvaluator::bundle`]) and must
/// return `(loglik, info)`.
#[cfg(feature = "python-bindings")]
pub struct PyEvaluator {
    callable: Py<PyAny>,
}

#[cfg(feature = "python-bindings")]
impl PyEvaluator {
    pub fn new(callable: &Bound<'_, PyAny>) -> PyResult<Self> {
        if !callable.is_callable() {
            return Err(pyo3::exceptions::PyTypeError::new_err("evaluator must be callable"));
        }
        Ok(PyEvaluator { callable: callable.clone().unbind() })
    }

    /// Python view of a [`LikelihoodProblem`].
    pub fn bundle<'py>(
        py: Python<'py>, problem: &LikelihoodProblem<'_>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let d = PyDict::new(py);
        d.set_item("dynamic_artifact", problem.dynamic_artifact.to_string_lossy().into_owned())?;
        d.set_item("n_estimated", problem.catalog.len())?;
        d.set_item("catalog", catalog_entries(py, &problem.catalog)?)?;
        d.set_item("subsamples", subsample_bounds(&problem.catalog))?;
        d.set_item("endo_nbr", problem.endo_nbr)?;
        d.set_item("exo_nbr", problem.exo_nbr)?;
        d.set_item("zeta_static", problem.partition.statics().to_vec())?;
        d.set_item("zeta_back", problem.partition.backward().to_vec())?;
        d.set_item("zeta_fwrd", problem.partition.forward().to_vec())?;
        d.set_item("zeta_mixed", problem.partition.mixed().to_vec())?;
        d.set_item("qz_criterium", problem.tolerances.qz_criterium)?;
        d.set_item("riccati_tol", problem.tolerances.riccati_tol)?;
        d.set_item("lyapunov_tol", problem.tolerances.lyapunov_complex_threshold)?;
        d.set_item("varobs", problem.varobs.to_vec())?;
        d.set_item("steady_state", problem.structural.steady_state.to_pyarray(py))?;
        d.set_item("est_params", problem.est_params.to_pyarray(py))?;
        d.set_item("deep_params", problem.structural.deep_params.to_pyarray(py))?;
        d.set_item("Q", problem.structural.q.to_pyarray(py))?;
        d.set_item("H", problem.structural.h.to_pyarray(py))?;
        d.set_item("data", problem.data.to_pyarray(py))?;
        d.set_item("diffuse", problem.diffuse)?;
        Ok(d)
    }
}

/// One dict per descriptor: `type` (source table name), `primary_index`,
/// `secondary_index` (or None), `subsample_ids`, `lower_bound`,
/// `upper_bound`, `prior` (shape name or None).
#[cfg(feature = "python-bindings")]
pub fn catalog_entries<'py>(
    py: Python<'py>, catalog: &EstimatedParametersDescription,
) -> PyResult<Bound<'py, PyList>> {
    let entries = PyList::empty(py);
    for param in catalog.iter() {
        let d = PyDict::new(py);
        d.set_item("type", param.param_type().table_name())?;
        d.set_item("primary_index", param.primary_index())?;
        d.set_item("secondary_index", param.secondary_index())?;
        d.set_item("subsample_ids", param.subsample_ids().to_vec())?;
        d.set_item("lower_bound", param.lower_bound())?;
        d.set_item("upper_bound", param.upper_bound())?;
        d.set_item("prior", param.prior().shape().map(|shape| shape.name()))?;
        entries.append(d)?;
    }
    Ok(entries)
}

/// `(start, end)` period pairs of the catalog's subsamples.
#[cfg(feature = "python-bindings")]
pub fn subsample_bounds(catalog: &EstimatedParametersDescription) -> Vec<(usize, usize)> {
    catalog.subsamples().iter().map(|s| (s.start(), s.end())).collect()
}

#[cfg(feature = "python-bindings")]
impl LikelihoodEvaluator for PyEvaluator {
    fn compute(&self, problem: &LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput> {
        Python::with_gil(|py| {
            let bundle = PyEvaluator::bundle(py, problem)
                .map_err(|e| EstimationError::Evaluator(e.to_string()))?;
            let (log_likelihood, info): (f64, i32) = self
                .callable
                .call1(py, (bundle,))
                .and_then(|ret| ret.extract(py))
                .map_err(|e| EstimationError::Evaluator(e.to_string()))?;
            Ok(EvaluatorOutput { log_likelihood, info })
        })
    }
}
