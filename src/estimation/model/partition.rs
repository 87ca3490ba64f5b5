//! Lead/lag partition of the endogenous variables.
//!
//! Purpose
//! -------
//! Classify every endogenous variable from the `3 x endo_nbr` lead/lag
//! incidence matrix into one of four roles used by the model solver:
//! static, backward-looking, forward-looking, or mixed.
//!
//! Key behaviors
//! -------------
//! - Row 0 of the incidence matrix flags a lagged occurrence, row 2 a lead;
//!   any non-zero entry counts as "appears". Row 1 (current period) does not
//!   affect the classification.
//! - Classes are filled in ascending column order.
//!
//! Invariants & assumptions
//! ------------------------
//! - The four classes are disjoint and their union is `0..endo_nbr`.
//! - The partition is recomputed on every likelihood call and never cached.
use crate::estimation::errors::{EstimationError, EstimationResult};
use ndarray::ArrayView2;
use tracing::trace;

const LAG_ROW: usize = 0;
const LEAD_ROW: usize = 2;

/// Role of one endogenous variable in the dynamic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableRole {
    /// Appears neither lagged nor led.
    Static,
    /// Appears lagged only.
    Backward,
    /// Appears led only.
    Forward,
    /// Appears both lagged and led.
    Mixed,
}

impl VariableRole {
    pub const fn from_flags(lag: bool, lead: bool) -> Self {
        match (lag, lead) {
            (false, false) => VariableRole::Static,
            (true, false) => VariableRole::Backward,
            (false, true) => VariableRole::Forward,
            (true, true) => VariableRole::Mixed,
        }
    }
}

/// Four disjoint, ascending index lists covering `0..endo_nbr`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariablePartition {
    statics: Vec<usize>,
    backward: Vec<usize>,
    forward: Vec<usize>,
    mixed: Vec<usize>,
}

impl VariablePartition {
    /// Partition the variables of a `3 x endo_nbr` incidence matrix.
    ///
    /// # Errors
    /// [`EstimationError::IncidenceShape`] unless the matrix has exactly 3
    /// rows and `endo_nbr` columns.
    pub fn from_incidence(lli: ArrayView2<'_, f64>, endo_nbr: usize) -> EstimationResult<Self> {
        check_incidence_shape(lli, endo_nbr)?;

        let mut partition = VariablePartition::default();
        for i in 0..endo_nbr {
            let role = VariableRole::from_flags(lli[[LAG_ROW, i]] != 0.0, lli[[LEAD_ROW, i]] != 0.0);
            partition.class_mut(role).push(i);
        }
        trace!(
            n_static = partition.statics.len(),
            n_backward = partition.backward.len(),
            n_forward = partition.forward.len(),
            n_mixed = partition.mixed.len(),
            "partitioned endogenous variables"
        );
        Ok(partition)
    }

    pub fn statics(&self) -> &[usize] {
        &self.statics
    }

    pub fn backward(&self) -> &[usize] {
        &self.backward
    }

    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    pub fn mixed(&self) -> &[usize] {
        &self.mixed
    }

    /// Indices of one class.
    pub fn class(&self, role: VariableRole) -> &[usize] {
        match role {
            VariableRole::Static => &self.statics,
            VariableRole::Backward => &self.backward,
            VariableRole::Forward => &self.forward,
            VariableRole::Mixed => &self.mixed,
        }
    }

    /// Role of variable `i`, `None` if `i` is not a partitioned index.
    pub fn role_of(&self, i: usize) -> Option<VariableRole> {
        [VariableRole::Static, VariableRole::Backward, VariableRole::Forward, VariableRole::Mixed]
            .into_iter()
            .find(|&role| self.class(role).binary_search(&i).is_ok())
    }

    /// Number of partitioned variables.
    pub fn n_endo(&self) -> usize {
        self.statics.len() + self.backward.len() + self.forward.len() + self.mixed.len()
    }

    fn class_mut(&mut self, role: VariableRole) -> &mut Vec<usize> {
        match role {
            VariableRole::Static => &mut self.statics,
            VariableRole::Backward => &mut self.backward,
            VariableRole::Forward => &mut self.forward,
            VariableRole::Mixed => &mut self.mixed,
        }
    }
}

pub(crate) fn check_incidence_shape(lli: ArrayView2<'_, f64>, endo_nbr: usize) -> EstimationResult<()> {
    if lli.nrows() != 3 || lli.ncols() != endo_nbr {
        return Err(EstimationError::IncidenceShape {
            rows: lli.nrows(),
            cols: lli.ncols(),
            endo_nbr,
        });
    }
    Ok(())
}
