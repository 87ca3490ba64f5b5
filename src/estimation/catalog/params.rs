//! Estimated-parameter descriptors.
//!
//! An [`EstimatedParameter`] records *which* quantity a coordinate of the
//! caller's parameter vector stands for (a shock standard deviation, a
//! measurement-error correlation, a deep parameter, ...), the bounds the
//! estimation treats as admissible, the subsamples over which it is held
//! constant, and its prior.
//!
//! ## Conventions
//! - Indices are **0-based**; the 1-based table values are converted once
//!   during decoding.
//! - `secondary_index` is `Some` exactly for the two correlation types.
//! - Descriptors are immutable after construction; all fields are read
//!   through accessors.
use crate::estimation::{
    catalog::prior::Prior,
    errors::{EstimationError, EstimationResult},
};

/// Kind of quantity an estimated parameter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Standard deviation of a structural shock (`var_exo`).
    ShockSd,
    /// Standard deviation of a measurement error (`var_endo`).
    MeasurementErrorSd,
    /// Correlation between two structural shocks (`corrx`).
    ShockCorr,
    /// Correlation between two measurement errors (`corrn`).
    MeasurementErrorCorr,
    /// Deep (structural) model parameter (`param_vals`).
    DeepParameter,
}

impl ParamType {
    /// Fixed processing order of the five source tables.
    pub const TABLE_ORDER: [ParamType; 5] = [
        ParamType::ShockSd,
        ParamType::MeasurementErrorSd,
        ParamType::ShockCorr,
        ParamType::MeasurementErrorCorr,
        ParamType::DeepParameter,
    ];

    /// `true` for the two correlation types, which carry a secondary index.
    pub const fn is_correlation(self) -> bool {
        matches!(self, ParamType::ShockCorr | ParamType::MeasurementErrorCorr)
    }

    /// Name of the source table holding rows of this type.
    pub const fn table_name(self) -> &'static str {
        match self {
            ParamType::ShockSd => "var_exo",
            ParamType::MeasurementErrorSd => "var_endo",
            ParamType::ShockCorr => "corrx",
            ParamType::MeasurementErrorCorr => "corrn",
            ParamType::DeepParameter => "param_vals",
        }
    }
}

/// EstimatedParameter — one coordinate of the estimated parameter vector.
///
/// Fields
/// ------
/// - `param_type`: [`ParamType`]
/// - `primary_index`: shock, observed-variable, or deep-parameter index.
/// - `secondary_index`: second shock / measurement-error index for
///   correlations, `None` otherwise.
/// - `subsample_ids`: subsamples over which the value is constant.
/// - `lower_bound`, `upper_bound`: admissible range (not validated here).
/// - `prior`: [`Prior`], `Prior::None` when prior construction is disabled.
///
/// Invariants
/// ----------
/// - `secondary_index.is_some() == param_type.is_correlation()`.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedParameter {
    param_type: ParamType,
    primary_index: usize,
    secondary_index: Option<usize>,
    subsample_ids: Vec<usize>,
    lower_bound: f64,
    upper_bound: f64,
    prior: Prior,
}

impl EstimatedParameter {
    /// Build a descriptor for a non-correlation type.
    ///
    /// # Errors
    /// [`EstimationError::InvalidDescriptor`] if `param_type` is a
    /// correlation type; use [`EstimatedParameter::correlation`] for those.
    pub fn new(
        param_type: ParamType, primary_index: usize, subsample_ids: Vec<usize>, lower_bound: f64,
        upper_bound: f64, prior: Prior,
    ) -> EstimationResult<Self> {
        if param_type.is_correlation() {
            return Err(EstimationError::InvalidDescriptor {
                table: param_type.table_name(),
                reason: "correlation parameters need a secondary index",
            });
        }
        Ok(EstimatedParameter {
            param_type,
            primary_index,
            secondary_index: None,
            subsample_ids,
            lower_bound,
            upper_bound,
            prior,
        })
    }

    /// Build a descriptor for a correlation type.
    ///
    /// # Errors
    /// [`EstimationError::InvalidDescriptor`] if `param_type` is not a
    /// correlation type.
    pub fn correlation(
        param_type: ParamType, primary_index: usize, secondary_index: usize,
        subsample_ids: Vec<usize>, lower_bound: f64, upper_bound: f64, prior: Prior,
    ) -> EstimationResult<Self> {
        if !param_type.is_correlation() {
            return Err(EstimationError::InvalidDescriptor {
                table: param_type.table_name(),
                reason: "only correlation parameters carry a secondary index",
            });
        }
        Ok(EstimatedParameter {
            param_type,
            primary_index,
            secondary_index: Some(secondary_index),
            subsample_ids,
            lower_bound,
            upper_bound,
            prior,
        })
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn primary_index(&self) -> usize {
        self.primary_index
    }

    pub fn secondary_index(&self) -> Option<usize> {
        self.secondary_index
    }

    pub fn subsample_ids(&self) -> &[usize] {
        &self.subsample_ids
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn prior(&self) -> &Prior {
        &self.prior
    }

    /// Whether `value` lies in `[lower_bound, upper_bound]`.
    pub fn within_bounds(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }
}
