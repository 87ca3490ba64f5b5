//! Ordered catalog of estimated parameters plus the estimation subsamples.
//!
//! Purpose
//! -------
//! Hold the flat, ordered list of [`EstimatedParameter`] descriptors that
//! defines the layout of the caller's parameter vector, together with the
//! subsamples over which parameters are held constant.
//!
//! Key behaviors
//! -------------
//! - Validate at construction that subsample bounds are ordered and that
//!   every descriptor references a declared subsample.
//! - Check a candidate vector against the descriptor bounds
//!   ([`EstimatedParametersDescription::check_bounds`]).
//! - Sum the descriptor priors at a candidate vector
//!   ([`EstimatedParametersDescription::log_prior_density`]).
//! - Write a candidate vector into the structural inputs it parameterizes
//!   ([`EstimatedParametersDescription::apply`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Position `k` of the caller's parameter vector corresponds to
//!   `params()[k]`; the order is fixed by the catalog builder.
//! - Subsample ids are positions into `subsamples()`.
//!
//! Conventions
//! -----------
//! - Standard deviations enter covariance matrices squared; correlations
//!   enter as `ρ·σ_i·σ_j` using the diagonal already present in the matrix,
//!   so SD coordinates must be applied before correlations. The fixed table
//!   order guarantees this.
use crate::estimation::{
    catalog::params::{EstimatedParameter, ParamType},
    errors::{EstimationError, EstimationResult},
};
use ndarray::{Array1, Array2, ArrayView1};

/// Contiguous span of periods `[start, end]` (inclusive, 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimationSubsample {
    start: usize,
    end: usize,
}

impl EstimationSubsample {
    /// # Errors
    /// [`EstimationError::InvalidSubsample`] if `start > end`.
    pub fn new(start: usize, end: usize) -> EstimationResult<Self> {
        if start > end {
            return Err(EstimationError::InvalidSubsample { start, end });
        }
        Ok(EstimationSubsample { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of periods covered; always at least one.
    pub fn n_periods(&self) -> usize {
        self.end - self.start + 1
    }
}

/// EstimatedParametersDescription — ordered parameter catalog.
///
/// Fields
/// ------
/// - `subsamples`: declared subsamples, referenced by position.
/// - `params`: descriptors in parameter-vector order.
///
/// Invariants
/// ----------
/// - Every id in every `params[k].subsample_ids()` is `< subsamples.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedParametersDescription {
    subsamples: Vec<EstimationSubsample>,
    params: Vec<EstimatedParameter>,
}

impl EstimatedParametersDescription {
    /// Bundle subsamples and descriptors after checking subsample references.
    ///
    /// # Errors
    /// [`EstimationError::UnknownSubsample`] for the first descriptor that
    /// references an undeclared subsample.
    pub fn new(
        subsamples: Vec<EstimationSubsample>, params: Vec<EstimatedParameter>,
    ) -> EstimationResult<Self> {
        for (position, param) in params.iter().enumerate() {
            if let Some(&subsample) =
                param.subsample_ids().iter().find(|&&id| id >= subsamples.len())
            {
                return Err(EstimationError::UnknownSubsample { position, subsample });
            }
        }
        Ok(EstimatedParametersDescription { subsamples, params })
    }

    pub fn subsamples(&self) -> &[EstimationSubsample] {
        &self.subsamples
    }

    pub fn params(&self) -> &[EstimatedParameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EstimatedParameter> {
        self.params.iter()
    }

    /// Number of descriptors of the given type.
    pub fn count_of(&self, param_type: ParamType) -> usize {
        self.params.iter().filter(|p| p.param_type() == param_type).count()
    }

    /// Verify that `theta` has one entry per descriptor.
    ///
    /// # Errors
    /// [`EstimationError::LengthMismatch`] on a length mismatch.
    pub fn check_len(&self, theta: ArrayView1<'_, f64>) -> EstimationResult<()> {
        if theta.len() != self.params.len() {
            return Err(EstimationError::LengthMismatch {
                field: "estimated parameters",
                expected: self.params.len(),
                actual: theta.len(),
            });
        }
        Ok(())
    }

    /// Check every coordinate of `theta` against its `[lower, upper]` bounds.
    ///
    /// # Errors
    /// - [`EstimationError::LengthMismatch`] if `theta` has the wrong length.
    /// - [`EstimationError::ParameterOutOfBounds`] for the first violation.
    pub fn check_bounds(&self, theta: ArrayView1<'_, f64>) -> EstimationResult<()> {
        self.check_len(theta)?;
        for (position, (param, &value)) in self.params.iter().zip(theta.iter()).enumerate() {
            if !param.within_bounds(value) {
                return Err(EstimationError::ParameterOutOfBounds {
                    position,
                    value,
                    lower: param.lower_bound(),
                    upper: param.upper_bound(),
                });
            }
        }
        Ok(())
    }

    /// Sum of log prior densities at `theta`.
    ///
    /// Descriptors without a prior contribute `0.0`, so a catalog built with
    /// priors disabled always returns `0.0`.
    ///
    /// # Errors
    /// [`EstimationError::LengthMismatch`] if `theta` has the wrong length.
    pub fn log_prior_density(&self, theta: ArrayView1<'_, f64>) -> EstimationResult<f64> {
        self.check_len(theta)?;
        Ok(self.params.iter().zip(theta.iter()).map(|(p, &x)| p.prior().ln_pdf(x)).sum())
    }

    /// Write `theta` into the structural inputs it parameterizes.
    ///
    /// Parameters
    /// ----------
    /// - `theta`: candidate vector in catalog order.
    /// - `deep_params`: deep-parameter vector, overwritten at estimated
    ///   positions.
    /// - `q`: shock covariance matrix (`exo_nbr x exo_nbr`).
    /// - `h`: measurement-error covariance (`n_obs x n_obs`).
    ///
    /// Behavior
    /// --------
    /// - `ShockSd` / `MeasurementErrorSd`: diagonal entry set to `v²`.
    /// - `ShockCorr` / `MeasurementErrorCorr`: symmetric off-diagonal pair set
    ///   to `v·√(M[i,i]·M[j,j])`.
    /// - `DeepParameter`: `deep_params[i] = v`.
    ///
    /// Errors
    /// ------
    /// - [`EstimationError::LengthMismatch`] if `theta` has the wrong length.
    /// - [`EstimationError::ParamIndexOutOfRange`] if a descriptor points
    ///   outside its target. Targets may be partially updated when this is
    ///   returned.
    pub fn apply(
        &self, theta: ArrayView1<'_, f64>, deep_params: &mut Array1<f64>, q: &mut Array2<f64>,
        h: &mut Array2<f64>,
    ) -> EstimationResult<()> {
        self.check_len(theta)?;
        for (position, (param, &value)) in self.params.iter().zip(theta.iter()).enumerate() {
            let i = param.primary_index();
            match param.param_type() {
                ParamType::ShockSd => {
                    check_index(position, "Sigma_e", i, q.nrows())?;
                    q[[i, i]] = value * value;
                }
                ParamType::MeasurementErrorSd => {
                    check_index(position, "H", i, h.nrows())?;
                    h[[i, i]] = value * value;
                }
                ParamType::ShockCorr => {
                    let j = param.secondary_index().unwrap_or(i);
                    set_correlation(position, "Sigma_e", q, i, j, value)?;
                }
                ParamType::MeasurementErrorCorr => {
                    let j = param.secondary_index().unwrap_or(i);
                    set_correlation(position, "H", h, i, j, value)?;
                }
                ParamType::DeepParameter => {
                    check_index(position, "params", i, deep_params.len())?;
                    deep_params[i] = value;
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EstimatedParametersDescription {
    type Item = &'a EstimatedParameter;
    type IntoIter = std::slice::Iter<'a, EstimatedParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

fn check_index(position: usize, target: &'static str, index: usize, len: usize) -> EstimationResult<()> {
    if index >= len {
        return Err(EstimationError::ParamIndexOutOfRange { position, target, index, len });
    }
    Ok(())
}

fn set_correlation(
    position: usize, target: &'static str, m: &mut Array2<f64>, i: usize, j: usize, rho: f64,
) -> EstimationResult<()> {
    check_index(position, target, i, m.nrows())?;
    check_index(position, target, j, m.nrows())?;
    let cov = rho * (m[[i, i]] * m[[j, j]]).sqrt();
    m[[i, j]] = cov;
    m[[j, i]] = cov;
    Ok(())
}
