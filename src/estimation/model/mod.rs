//! model — configuration, variable partition, and likelihood assembly.
//!
//! Purpose
//! -------
//! Validate the model environment, derive the per-call inputs of the
//! likelihood evaluator, and map the evaluator's answer to a scalar.
//!
//! Key behaviors
//! -------------
//! - [`config`]: [`EstimationConfig`] and its validated components.
//! - [`partition`]: static / backward / forward / mixed classification.
//! - [`structural`]: per-call steady state, deep parameters, Q and H.
//! - [`evaluator`]: the [`LikelihoodEvaluator`] seam and its bundle.
//! - [`status`]: evaluator status codes.
//! - [`assembly`]: [`loglikelihood`] and [`assemble`].

pub mod assembly;
pub mod config;
pub mod evaluator;
pub mod partition;
pub mod status;
pub mod structural;

pub use self::assembly::{
    AssemblyInputs, assemble, dynamic_artifact_path, loglikelihood, loglikelihood_with,
};
pub use self::config::{
    EstimationConfig, EstimationOptions, EstimationResults, ModelDescription, SolverTolerances,
};
pub use self::evaluator::{EvaluatorOutput, LikelihoodEvaluator, LikelihoodProblem};
pub use self::partition::{VariablePartition, VariableRole};
pub use self::status::{check_output, describe_info};
pub use self::structural::StructuralInputs;
