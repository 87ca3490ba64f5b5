//! estimation::errors — error surface for catalog building, model assembly,
//! and likelihood evaluation.
//!
//! Purpose
//! -------
//! Provide a single error enum, [`EstimationError`], and the result alias
//! [`EstimationResult`] used across the estimation stack, from decoding the
//! estimated-parameter tables down to the status code reported by the
//! likelihood evaluator.
//!
//! Key behaviors
//! -------------
//! - Attach the offending payload (table name, row, column, shape, info code)
//!   to every variant so that messages are self-describing.
//! - Keep the three abort classes distinct: malformed shapes, missing or
//!   unreadable named fields, and evaluator-reported failures.
//! - Convert to a Python `ValueError` at the PyO3 boundary when the
//!   `python-bindings` feature is enabled.
//!
//! Conventions
//! -----------
//! - Indices carried in error payloads are 0-based unless the variant stores
//!   the raw table value (`value: f64`), which is reported exactly as read.
//! - Shapes are reported as `(rows, cols)`.
//! - Evaluator failures keep the numeric `info` code next to its
//!   human-readable description (see [`describe_info`]).
//!
//! [`describe_info`]: crate::estimation::model::status::describe_info
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};
use thiserror::Error;

/// Crate-wide result alias for estimation operations.
pub type EstimationResult<T> = Result<T, EstimationError>;

/// Unified error type for the estimation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    // ---- Estimated-parameter tables ----
    /// A table has fewer columns than its parameter type needs.
    #[error("Table '{table}' must have at least {expected} columns, got {actual}")]
    TableColumnMismatch { table: &'static str, expected: usize, actual: usize },

    /// An index column holds a value that is not a positive integer.
    #[error(
        "Table '{table}', row {row}, column '{column}': expected a positive integer index, got {value}"
    )]
    InvalidTableIndex { table: &'static str, row: usize, column: &'static str, value: f64 },

    /// Descriptor constructor used with the wrong kind of parameter type.
    #[error("Invalid descriptor for '{table}' parameters: {reason}")]
    InvalidDescriptor { table: &'static str, reason: &'static str },

    /// A descriptor references a subsample that is not declared.
    #[error("Estimated parameter {position} references unknown subsample {subsample}")]
    UnknownSubsample { position: usize, subsample: usize },

    /// A subsample must satisfy start <= end.
    #[error("Subsample bounds must satisfy start <= end; got start {start}, end {end}")]
    InvalidSubsample { start: usize, end: usize },

    /// The sample must contain at least one period.
    #[error("Data must contain at least one period")]
    EmptySample,

    // ---- Priors ----
    /// Prior shape code outside the supported set.
    #[error("Unknown prior shape code: {code}")]
    UnknownPriorShape { code: f64 },

    /// Prior hyper-parameter rejected while constructing the density.
    #[error("Invalid {shape} prior: {param} = {value}. {reason}")]
    InvalidPriorParam {
        shape: &'static str,
        param: &'static str,
        value: f64,
        reason: &'static str,
    },

    // ---- Model shapes ----
    /// Lead/lag incidence matrix is not 3 x endo_nbr.
    #[error(
        "Incorrect lead/lag incidence matrix: expected 3 x {endo_nbr}, got {rows} x {cols}"
    )]
    IncidenceShape { rows: usize, cols: usize, endo_nbr: usize },

    /// Observed-variable ids are not a single row.
    #[error("varobs_id must be a row vector; got {rows} rows")]
    VarobsNotRowVector { rows: usize },

    /// Observed-variable id out of range.
    #[error("varobs_id entry {position} is not a valid variable index: {value} (endo_nbr = {endo_nbr})")]
    InvalidVarobsIndex { position: usize, value: f64, endo_nbr: usize },

    /// Data row count differs from the number of observed variables.
    #[error("Data has {rows} rows but there are {n_varobs} observed variables")]
    DataRowsMismatch { rows: usize, n_varobs: usize },

    /// A matrix field has the wrong shape.
    #[error("'{field}' must be {expected:?}, got {actual:?}")]
    MatrixShape { field: &'static str, expected: (usize, usize), actual: (usize, usize) },

    /// A vector field has the wrong length.
    #[error("'{field}' must have length {expected}, got {actual}")]
    LengthMismatch { field: &'static str, expected: usize, actual: usize },

    /// A numerical option must be finite and strictly positive.
    #[error("Option '{field}' must be finite and > 0; got {value}")]
    InvalidTolerance { field: &'static str, value: f64 },

    // ---- Parameter vectors ----
    /// Estimated parameter points outside its target array.
    #[error(
        "Estimated parameter {position} targets index {index} of '{target}' (length {len})"
    )]
    ParamIndexOutOfRange { position: usize, target: &'static str, index: usize, len: usize },

    /// Candidate value outside [lower, upper].
    #[error(
        "Estimated parameter {position} = {value} violates its bounds [{lower}, {upper}]"
    )]
    ParameterOutOfBounds { position: usize, value: f64, lower: f64, upper: f64 },

    // ---- Named-field environment ----
    /// A named field is absent from an environment object.
    #[error("Missing field '{field}' in '{object}'")]
    MissingField { object: String, field: String },

    /// A named field exists but could not be read as the expected type.
    #[error("Field '{field}' in '{object}' is unreadable: {reason}")]
    UnreadableField { object: String, field: String, reason: String },

    // ---- Evaluator ----
    /// The evaluator reported a non-zero info code.
    #[error("Likelihood evaluation failed with info = {info}: {description}")]
    EvaluatorFailed { info: i32, description: String },

    /// The evaluator returned a non-finite value with info = 0.
    #[error("Likelihood evaluation returned a non-finite value: {value}")]
    NonFiniteLikelihood { value: f64 },

    /// The evaluator backend raised its own error.
    #[error("Likelihood evaluator error: {0}")]
    Evaluator(String),
}

#[cfg(feature = "python-bindings")]
impl From<EstimationError> for PyErr {
    fn from(err: EstimationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `Display` messages embedding their payloads.
    //
    // They intentionally DO NOT cover:
    // - The `From<EstimationError> for PyErr` conversion, which needs the
    //   Python C API.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that the incidence-shape error names both the expected and the
    // actual dimensions.
    //
    // Given
    // -----
    // - `IncidenceShape { rows: 2, cols: 4, endo_nbr: 4 }`.
    //
    // Expect
    // ------
    // - Message contains "3 x 4" and "2 x 4".
    fn incidence_shape_message_reports_expected_and_actual() {
        let err = EstimationError::IncidenceShape { rows: 2, cols: 4, endo_nbr: 4 };

        let msg = err.to_string();

        assert!(msg.contains("3 x 4"), "Got: {msg}");
        assert!(msg.contains("2 x 4"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that table diagnostics point at the table, row and column.
    //
    // Given
    // -----
    // - `InvalidTableIndex` for table "corrx", row 2, column "secondary index".
    //
    // Expect
    // ------
    // - Message contains all three locators and the raw value.
    fn table_index_message_is_column_level() {
        let err = EstimationError::InvalidTableIndex {
            table: "corrx",
            row: 2,
            column: "secondary index",
            value: 0.5,
        };

        let msg = err.to_string();

        assert!(msg.contains("corrx"), "Got: {msg}");
        assert!(msg.contains("row 2"), "Got: {msg}");
        assert!(msg.contains("secondary index"), "Got: {msg}");
        assert!(msg.contains("0.5"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure evaluator failures keep the info code visible.
    //
    // Given
    // -----
    // - `EvaluatorFailed { info: 3, .. }`.
    //
    // Expect
    // ------
    // - Message contains "info = 3" and the description.
    fn evaluator_failure_message_contains_info_code() {
        let err = EstimationError::EvaluatorFailed {
            info: 3,
            description: "no stable equilibrium".to_string(),
        };

        let msg = err.to_string();

        assert!(msg.contains("info = 3"), "Got: {msg}");
        assert!(msg.contains("no stable equilibrium"), "Got: {msg}");
    }
}
