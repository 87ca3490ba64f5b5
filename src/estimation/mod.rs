//! estimation — likelihood evaluation pipeline for linearized DSGE models.
//!
//! Purpose
//! -------
//! Provide the glue between the estimated-parameter tables, the model
//! description and an external likelihood evaluator: build the ordered
//! parameter catalog, validate and partition the model, assemble the
//! per-call inputs, and return the log-likelihood of a candidate parameter
//! vector.
//!
//! Key behaviors
//! -------------
//! - [`catalog`] decodes the five estimated-parameter tables.
//! - [`model`] holds the explicit configuration, the variable partition, the
//!   evaluator seam and the [`loglikelihood`] entry point.
//! - [`batch`] evaluates many candidates or datasets in parallel.
//! - [`errors`] defines [`EstimationError`] for every failure mode.
//!
//! Conventions
//! -----------
//! - Indices are 0-based in every Rust type; 1-based values only appear in
//!   raw tables and `varobs_id` before decoding.
//! - Data is `n_obs x n_periods` (one row per observed variable).
//! - The crate never solves the model itself; numerical work belongs to the
//!   [`LikelihoodEvaluator`].
//!
//! Downstream usage
//! ----------------
//! - `use dsge_estimation::estimation::prelude::*;` brings in the types
//!   needed to build a configuration and call [`loglikelihood`].

pub mod batch;
pub mod catalog;
pub mod errors;
pub mod model;

pub use self::batch::{batch_loglikelihood, batch_loglikelihood_datasets};
pub use self::errors::{EstimationError, EstimationResult};
pub use self::model::{LikelihoodEvaluator, loglikelihood};

/// Types needed for a typical likelihood evaluation.
pub mod prelude {
    pub use super::batch::{batch_loglikelihood, batch_loglikelihood_datasets};
    pub use super::catalog::{
        CatalogBuilder, EstimatedParameter, EstimatedParametersDescription,
        EstimatedParamsTables, ParamType, Prior, PriorPolicy,
    };
    pub use super::errors::{EstimationError, EstimationResult};
    pub use super::model::{
        EstimationConfig, EstimationOptions, EstimationResults, EvaluatorOutput,
        LikelihoodEvaluator, LikelihoodProblem, ModelDescription, SolverTolerances,
        StructuralInputs, VariablePartition, loglikelihood, loglikelihood_with,
    };
}
