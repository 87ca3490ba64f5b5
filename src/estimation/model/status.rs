//! Evaluator status codes.
//!
//! The likelihood evaluator reports success as `info == 0`. Any other value
//! is a failure of the solver, the filter or the parameter checks, and is
//! surfaced as [`EstimationError::EvaluatorFailed`] together with the
//! message returned by [`describe_info`].
use crate::estimation::{
    errors::{EstimationError, EstimationResult},
    model::evaluator::EvaluatorOutput,
};

/// Human-readable description of an evaluator status code.
pub fn describe_info(info: i32) -> &'static str {
    match info {
        0 => "no error",
        1 => "the model doesn't determine the current variables uniquely",
        2 => "MJDGGES returned an error code",
        3 => "Blanchard & Kahn conditions are not satisfied: no stable equilibrium",
        4 => "Blanchard & Kahn conditions are not satisfied: indeterminacy",
        5 => "Blanchard & Kahn conditions are not satisfied: indeterminacy due to rank failure",
        6 => "the jacobian evaluated at the deterministic steady state is complex or infinite",
        7 => "one of the eigenvalues is close to 0/0 (the absolute value of numerator and denominator is smaller than 1e-6)",
        19 => "the steadystate routine has thrown an exception (inconsistent deep parameters)",
        20 => "cannot find the steady state",
        21 => "the steady state is complex",
        22 => "the steady state has NaNs",
        23 => "parameters updated in the steadystate routine are complex",
        24 => "parameters updated in the steadystate routine have NaNs",
        30 => "ergodic variance can't be computed",
        41 => "one (many) parameter(s) do(es) not satisfy the lower bound",
        42 => "one (many) parameter(s) do(es) not satisfy the upper bound",
        43 => "the covariance matrix of the structural innovations is not positive definite",
        44 => "the covariance matrix of the measurement errors is not positive definite",
        45 => "likelihood is not a number (NaN)",
        46 => "likelihood is a complex valued number",
        47 => "posterior kernel is not a number (NaN)",
        48 => "posterior kernel is a complex valued number",
        _ => "unknown error",
    }
}

/// Map an evaluator output to the scalar log-likelihood.
///
/// # Errors
/// - [`EstimationError::EvaluatorFailed`] when `info != 0`.
/// - [`EstimationError::NonFiniteLikelihood`] when `info == 0` but the
///   value is NaN or infinite.
pub fn check_output(output: EvaluatorOutput) -> EstimationResult<f64> {
    if output.info != 0 {
        return Err(EstimationError::EvaluatorFailed {
            info: output.info,
            description: describe_info(output.info).to_owned(),
        });
    }
    if !output.log_likelihood.is_finite() {
        return Err(EstimationError::NonFiniteLikelihood { value: output.log_likelihood });
    }
    Ok(output.log_likelihood)
}
