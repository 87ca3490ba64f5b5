//! catalog — estimated-parameter tables, descriptors, and priors.
//!
//! Purpose
//! -------
//! Turn the five estimated-parameter tables into the ordered catalog that
//! defines the layout of the parameter vector scored by the likelihood
//! evaluator.
//!
//! Key behaviors
//! -------------
//! - [`schema`]: explicit column layout per parameter type with column-level
//!   diagnostics.
//! - [`params`]: [`ParamType`] and the immutable [`EstimatedParameter`]
//!   descriptor.
//! - [`prior`]: the [`Prior`] variants selected by shape code.
//! - [`description`]: the ordered [`EstimatedParametersDescription`] with
//!   bounds checks, prior sums and parameter application.
//! - [`builder`]: [`CatalogBuilder`] over [`EstimatedParamsTables`].
//!
//! Conventions
//! -----------
//! - Table indices are 1-based on input and 0-based everywhere after
//!   decoding.
//! - Table order is fixed: `var_exo`, `var_endo`, `corrx`, `corrn`,
//!   `param_vals`.

pub mod builder;
pub mod description;
pub mod params;
pub mod prior;
pub mod schema;

pub use self::builder::{CatalogBuilder, EstimatedParamsTables, PriorPolicy, WHOLE_SAMPLE};
pub use self::description::{EstimatedParametersDescription, EstimationSubsample};
pub use self::params::{EstimatedParameter, ParamType};
pub use self::prior::{Prior, PriorShape};
pub use self::schema::{ParamRow, TableSchema};
