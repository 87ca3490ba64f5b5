//! Per-call structural inputs: steady state, deep parameters, Q and H.
//!
//! Built fresh for every likelihood evaluation from the configuration and
//! owned by that call. The `1 x 1` zero H shorthand ("no measurement error")
//! is expanded here, so evaluators always see an `n_obs x n_obs` matrix.
use crate::estimation::{
    catalog::EstimatedParametersDescription,
    errors::{EstimationError, EstimationResult},
    model::config::{EstimationConfig, check_square, is_zero_shorthand},
};
use ndarray::{Array1, Array2, ArrayView1};

/// Owned structural matrices for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralInputs {
    /// Steady state (`endo_nbr`).
    pub steady_state: Array1<f64>,
    /// Deep parameters (`param_nbr`).
    pub deep_params: Array1<f64>,
    /// Shock covariance (`exo_nbr x exo_nbr`).
    pub q: Array2<f64>,
    /// Measurement-error covariance (`n_obs x n_obs`).
    pub h: Array2<f64>,
}

impl StructuralInputs {
    /// Bundle the matrices, expanding the H shorthand.
    ///
    /// # Errors
    /// - [`EstimationError::MatrixShape`] if `q` is not square, or if `h` is
    ///   neither the `1 x 1` zero shorthand nor `n_obs x n_obs`.
    pub fn new(
        steady_state: Array1<f64>, deep_params: Array1<f64>, q: Array2<f64>, h: Array2<f64>,
        n_obs: usize,
    ) -> EstimationResult<Self> {
        check_square("Sigma_e", q.view(), q.nrows())?;
        let h = if is_zero_shorthand(h.view()) {
            Array2::zeros((n_obs, n_obs))
        } else {
            check_square("H", h.view(), n_obs)?;
            h
        };
        Ok(StructuralInputs { steady_state, deep_params, q, h })
    }

    /// Copy the structural inputs out of a validated configuration.
    ///
    /// # Errors
    /// See [`StructuralInputs::new`]; unreachable for a configuration built by
    /// [`EstimationConfig::new`].
    pub fn from_config(config: &EstimationConfig) -> EstimationResult<Self> {
        StructuralInputs::new(
            config.results.steady_state.clone(),
            config.model.params.clone(),
            config.model.sigma_e.clone(),
            config.model.h.clone(),
            config.options.n_varobs(),
        )
    }

    /// Copy of `self` with a candidate vector written into deep parameters,
    /// Q and H (see [`EstimatedParametersDescription::apply`]).
    ///
    /// # Errors
    /// [`EstimationError::LengthMismatch`] or
    /// [`EstimationError::ParamIndexOutOfRange`] from the catalog.
    pub fn with_candidate(
        &self, catalog: &EstimatedParametersDescription, theta: ArrayView1<'_, f64>,
    ) -> EstimationResult<Self> {
        let mut updated = self.clone();
        catalog.apply(theta, &mut updated.deep_params, &mut updated.q, &mut updated.h)?;
        Ok(updated)
    }

    pub fn n_obs(&self) -> usize {
        self.h.nrows()
    }

    pub fn exo_nbr(&self) -> usize {
        self.q.nrows()
    }
}

impl TryFrom<&EstimationConfig> for StructuralInputs {
    type Error = EstimationError;

    fn try_from(config: &EstimationConfig) -> EstimationResult<Self> {
        StructuralInputs::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::catalog::{EstimatedParameter, EstimationSubsample, ParamType, Prior};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Expansion of the 1 x 1 zero H shorthand.
    // - Shape checks on Q and H.
    // - Writing a candidate vector into a copy of the inputs.
    // -------------------------------------------------------------------------

    fn build(h: Array2<f64>, n_obs: usize) -> EstimationResult<StructuralInputs> {
        StructuralInputs::new(array![1.0, 2.0], array![0.5], Array2::eye(2), h, n_obs)
    }

    #[test]
    // Purpose
    // -------
    // The shorthand and an explicit zero matrix give identical inputs.
    //
    // Given
    // -----
    // - `H = [[0]]` and `H = zeros(3, 3)` with three observables.
    //
    // Expect
    // ------
    // - Equal `StructuralInputs`, H of shape 3 x 3.
    fn zero_shorthand_matches_explicit_zero_matrix() {
        let short = build(array![[0.0]], 3).unwrap();
        let explicit = build(Array2::zeros((3, 3)), 3).unwrap();

        assert_eq!(short, explicit);
        assert_eq!(short.n_obs(), 3);
    }

    #[test]
    // Purpose
    // -------
    // A non-zero 1 x 1 H is not the shorthand; it must match n_obs.
    //
    // Given
    // -----
    // - `H = [[0.2]]` with one and with two observables.
    //
    // Expect
    // ------
    // - Accepted as-is for one observable, `MatrixShape` for two.
    fn non_zero_scalar_h_is_not_expanded() {
        assert_eq!(build(array![[0.2]], 1).unwrap().h, array![[0.2]]);
        assert_eq!(
            build(array![[0.2]], 2).unwrap_err(),
            EstimationError::MatrixShape { field: "H", expected: (2, 2), actual: (1, 1) }
        );
    }

    #[test]
    // Purpose
    // -------
    // Q must be square.
    //
    // Given
    // -----
    // - A 2 x 3 shock covariance.
    //
    // Expect
    // ------
    // - `MatrixShape { field: "Sigma_e" }`.
    fn q_must_be_square() {
        let err = StructuralInputs::new(
            array![1.0],
            array![0.5],
            Array2::zeros((2, 3)),
            array![[0.0]],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, EstimationError::MatrixShape { field: "Sigma_e", .. }));
    }

    #[test]
    // Purpose
    // -------
    // `with_candidate` leaves the original untouched.
    //
    // Given
    // -----
    // - Catalog [ShockSd(0), DeepParameter(0)], theta = [0.3, 0.9].
    //
    // Expect
    // ------
    // - Copy has Q[0,0] = 0.09 and deep[0] = 0.9; original unchanged.
    fn with_candidate_updates_a_copy() {
        let base = build(array![[0.0]], 1).unwrap();
        let catalog = EstimatedParametersDescription::new(
            vec![EstimationSubsample::new(0, 9).unwrap()],
            vec![
                EstimatedParameter::new(ParamType::ShockSd, 0, vec![0], 0.0, 1.0, Prior::None)
                    .unwrap(),
                EstimatedParameter::new(ParamType::DeepParameter, 0, vec![0], 0.0, 1.0, Prior::None)
                    .unwrap(),
            ],
        )
        .unwrap();

        let updated = base.with_candidate(&catalog, array![0.3, 0.9].view()).unwrap();

        assert_relative_eq!(updated.q[[0, 0]], 0.09, epsilon = 1e-12);
        assert_relative_eq!(updated.deep_params[0], 0.9);
        assert_eq!(base.q[[0, 0]], 1.0);
        assert_eq!(base.deep_params[0], 0.5);
    }
}
