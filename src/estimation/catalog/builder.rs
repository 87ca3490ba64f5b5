//! Catalog builder — five estimated-parameter tables to one ordered catalog.
//!
//! Purpose
//! -------
//! Decode the `var_exo`, `var_endo`, `corrx`, `corrn` and `param_vals`
//! tables into an [`EstimatedParametersDescription`] whose order defines the
//! layout of the caller's parameter vector.
//!
//! Key behaviors
//! -------------
//! - Process tables in the fixed order of [`ParamType::TABLE_ORDER`], rows
//!   top-to-bottom, one descriptor per row.
//! - Attach every descriptor to the single whole-sample subsample `0`,
//!   spanning periods `0..=n_periods - 1`.
//! - Leave priors empty by default ([`PriorPolicy::Disabled`]); with
//!   [`PriorPolicy::Eager`] build a [`Prior`] from the shape columns and fail
//!   on unknown shape codes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Catalog length equals the sum of table row counts.
//! - No bound validation is performed (`lower <= upper` is not checked).
//!
//! Testing notes
//! -------------
//! - Unit tests cover ordering across and within tables, secondary-index
//!   population, subsample wiring, both prior policies, and malformed tables.
use crate::estimation::{
    catalog::{
        description::{EstimatedParametersDescription, EstimationSubsample},
        params::{EstimatedParameter, ParamType},
        prior::{Prior, PriorShape},
        schema::{ParamRow, TableSchema},
    },
    errors::{EstimationError, EstimationResult},
};
use ndarray::{Array2, ArrayView2};
use tracing::{debug, trace};

/// Identifier of the whole-sample subsample every descriptor refers to.
pub const WHOLE_SAMPLE: usize = 0;

/// The five estimated-parameter tables, one per [`ParamType`].
///
/// Each table is `rows x columns` with the layout described in
/// [`crate::estimation::catalog::schema`]. Tables with no estimated
/// parameters are `0 x k` (any `k`).
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedParamsTables {
    pub var_exo: Array2<f64>,
    pub var_endo: Array2<f64>,
    pub corrx: Array2<f64>,
    pub corrn: Array2<f64>,
    pub param_vals: Array2<f64>,
}

impl EstimatedParamsTables {
    /// Table for the given parameter type.
    pub fn table(&self, param_type: ParamType) -> ArrayView2<'_, f64> {
        match param_type {
            ParamType::ShockSd => self.var_exo.view(),
            ParamType::MeasurementErrorSd => self.var_endo.view(),
            ParamType::ShockCorr => self.corrx.view(),
            ParamType::MeasurementErrorCorr => self.corrn.view(),
            ParamType::DeepParameter => self.param_vals.view(),
        }
    }

    /// Total number of rows over the five tables.
    pub fn total_rows(&self) -> usize {
        ParamType::TABLE_ORDER.iter().map(|&t| self.table(t).nrows()).sum()
    }

    /// Check every table's column count against its schema.
    ///
    /// # Errors
    /// [`EstimationError::TableColumnMismatch`] for the first malformed table.
    pub fn validate(&self) -> EstimationResult<()> {
        for t in ParamType::TABLE_ORDER {
            TableSchema::for_type(t).check_table(self.table(t))?;
        }
        Ok(())
    }

    /// Tables with no estimated parameters.
    pub fn empty() -> Self {
        EstimatedParamsTables {
            var_exo: Array2::zeros((0, 9)),
            var_endo: Array2::zeros((0, 9)),
            corrx: Array2::zeros((0, 10)),
            corrn: Array2::zeros((0, 10)),
            param_vals: Array2::zeros((0, 9)),
        }
    }
}

/// Whether prior columns are turned into [`Prior`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorPolicy {
    /// Decode prior columns but attach [`Prior::None`] to every descriptor.
    #[default]
    Disabled,
    /// Build priors eagerly; unknown shape codes and invalid hyper-parameters
    /// are errors.
    Eager,
}

/// CatalogBuilder — decodes [`EstimatedParamsTables`] into a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogBuilder {
    prior_policy: PriorPolicy,
}

impl CatalogBuilder {
    pub fn new(prior_policy: PriorPolicy) -> Self {
        CatalogBuilder { prior_policy }
    }

    pub fn prior_policy(&self) -> PriorPolicy {
        self.prior_policy
    }

    /// Build the catalog for a sample of `n_periods` periods.
    ///
    /// Parameters
    /// ----------
    /// - `tables`: the five estimated-parameter tables.
    /// - `n_periods`: number of observed periods (data columns).
    ///
    /// Returns
    /// -------
    /// An [`EstimatedParametersDescription`] with one subsample
    /// `(0, n_periods - 1)` and one descriptor per table row, in table order.
    ///
    /// Errors
    /// ------
    /// - [`EstimationError::EmptySample`] if `n_periods == 0`.
    /// - [`EstimationError::TableColumnMismatch`] /
    ///   [`EstimationError::InvalidTableIndex`] for malformed tables.
    /// - [`EstimationError::UnknownPriorShape`] /
    ///   [`EstimationError::InvalidPriorParam`] under [`PriorPolicy::Eager`].
    pub fn build(
        &self, tables: &EstimatedParamsTables, n_periods: usize,
    ) -> EstimationResult<EstimatedParametersDescription> {
        if n_periods == 0 {
            return Err(EstimationError::EmptySample);
        }
        let subsamples = vec![EstimationSubsample::new(0, n_periods - 1)?];

        let mut params = Vec::with_capacity(tables.total_rows());
        for param_type in ParamType::TABLE_ORDER {
            self.fill_from_table(param_type, tables.table(param_type), &mut params)?;
        }
        debug!(
            n_params = params.len(),
            n_periods,
            prior_policy = ?self.prior_policy,
            "built estimated-parameter catalog"
        );

        EstimatedParametersDescription::new(subsamples, params)
    }

    fn fill_from_table(
        &self, param_type: ParamType, table: ArrayView2<'_, f64>,
        out: &mut Vec<EstimatedParameter>,
    ) -> EstimationResult<()> {
        let schema = TableSchema::for_type(param_type);
        schema.check_table(table)?;
        for (row_idx, row) in table.outer_iter().enumerate() {
            let decoded = schema.decode_row(row_idx, row)?;
            out.push(self.descriptor(param_type, &decoded)?);
        }
        trace!(table = schema.table_name(), rows = table.nrows(), "decoded table");
        Ok(())
    }

    fn descriptor(&self, param_type: ParamType, row: &ParamRow) -> EstimationResult<EstimatedParameter> {
        let prior = match self.prior_policy {
            PriorPolicy::Disabled => Prior::None,
            PriorPolicy::Eager => Prior::construct(
                PriorShape::from_code(row.prior_shape)?,
                row.prior_mean,
                row.prior_std,
                row.prior_p3,
                row.prior_p4,
            )?,
        };
        let subsample_ids = vec![WHOLE_SAMPLE];
        match row.secondary_index {
            Some(secondary) => EstimatedParameter::correlation(
                param_type,
                row.primary_index,
                secondary,
                subsample_ids,
                row.lower_bound,
                row.upper_bound,
                prior,
            ),
            None => EstimatedParameter::new(
                param_type,
                row.primary_index,
                subsample_ids,
                row.lower_bound,
                row.upper_bound,
                prior,
            ),
        }
    }
}
