//! Model assembly — validated inputs to one likelihood evaluation.
//!
//! Purpose
//! -------
//! Combine the configuration, the candidate parameter vector and the data
//! into a [`LikelihoodProblem`], pass it to a [`LikelihoodEvaluator`], and
//! return the scalar log-likelihood unmodified.
//!
//! Key behaviors
//! -------------
//! - [`loglikelihood`] is the call surface: it builds the catalog for the
//!   sample length, copies the structural inputs, and calls [`assemble`].
//! - [`assemble`] validates the incidence matrix and the data row count,
//!   recomputes the variable partition, and forwards the bundle.
//! - Evaluator status codes are checked by
//!   [`check_output`](crate::estimation::model::status::check_output); a
//!   failure is never replaced by a fallback value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nothing is cached between calls and no input is mutated.
//! - All per-call buffers are owned values dropped on every exit path.
//! - The parameter vector length is not checked here.
//!
//! Downstream usage
//! ----------------
//! - Single evaluations go through [`loglikelihood`]; many candidates
//!   through [`batch_loglikelihood`](crate::estimation::batch::batch_loglikelihood).
//! - Callers that need priors decoded use [`loglikelihood_with`] and a
//!   [`CatalogBuilder`] configured with `PriorPolicy::Eager`.
use crate::estimation::{
    catalog::{CatalogBuilder, EstimatedParametersDescription},
    errors::{EstimationError, EstimationResult},
    model::{
        config::{EstimationConfig, SolverTolerances},
        evaluator::{LikelihoodEvaluator, LikelihoodProblem},
        partition::{VariablePartition, check_incidence_shape},
        status::check_output,
        structural::StructuralInputs,
    },
};
use ndarray::{ArrayView1, ArrayView2};
use std::path::PathBuf;
use tracing::debug;

/// Path of the compiled dynamic model for `fname` and a platform extension.
pub fn dynamic_artifact_path(fname: &str, mexext: &str) -> PathBuf {
    PathBuf::from(format!("{fname}_dynamic{mexext}"))
}

/// Raw ingredients of one evaluation, before validation.
#[derive(Debug, Clone)]
pub struct AssemblyInputs<'a> {
    pub dynamic_artifact: PathBuf,
    pub endo_nbr: usize,
    pub exo_nbr: usize,
    /// `3 x endo_nbr` lead/lag incidence matrix.
    pub incidence: ArrayView2<'a, f64>,
    /// Observed-variable indices, 0-based.
    pub varobs: &'a [usize],
    pub tolerances: SolverTolerances,
    pub structural: StructuralInputs,
    pub est_params: ArrayView1<'a, f64>,
    pub catalog: EstimatedParametersDescription,
    /// Observations, `n_obs x n_periods`.
    pub data: ArrayView2<'a, f64>,
}

/// Validate the inputs, build the [`LikelihoodProblem`], and evaluate it.
///
/// Errors
/// ------
/// - [`EstimationError::IncidenceShape`] if the incidence matrix is not
///   `3 x endo_nbr`.
/// - [`EstimationError::DataRowsMismatch`] if the data row count differs
///   from the number of observed variables.
/// - [`EstimationError::MatrixShape`] if H is not `n_obs x n_obs`.
/// - Whatever the evaluator returns, and the status errors of
///   [`check_output`].
pub fn assemble<E>(inputs: AssemblyInputs<'_>, evaluator: &E) -> EstimationResult<f64>
where
    E: LikelihoodEvaluator + ?Sized,
{
    let n_varobs = inputs.varobs.len();
    check_shapes(inputs.incidence, inputs.endo_nbr, n_varobs, inputs.data)?;
    let partition = VariablePartition::from_incidence(inputs.incidence, inputs.endo_nbr)?;
    if inputs.structural.h.dim() != (n_varobs, n_varobs) {
        return Err(EstimationError::MatrixShape {
            field: "H",
            expected: (n_varobs, n_varobs),
            actual: inputs.structural.h.dim(),
        });
    }

    let problem = LikelihoodProblem {
        dynamic_artifact: inputs.dynamic_artifact,
        catalog: inputs.catalog,
        endo_nbr: inputs.endo_nbr,
        exo_nbr: inputs.exo_nbr,
        partition,
        tolerances: inputs.tolerances,
        varobs: inputs.varobs,
        structural: inputs.structural,
        est_params: inputs.est_params,
        data: inputs.data,
        diffuse: false,
    };
    debug!(
        artifact = %problem.dynamic_artifact.display(),
        n_endo = problem.endo_nbr,
        n_obs = n_varobs,
        n_periods = problem.n_periods(),
        n_estimated = problem.catalog.len(),
        "evaluating log-likelihood"
    );

    let output = evaluator.compute(&problem)?;
    if output.info != 0 {
        debug!(info = output.info, "likelihood evaluator reported a failure");
    }
    check_output(output)
}

/// Incidence shape, then data rows against the observed variables.
fn check_shapes(
    incidence: ArrayView2<'_, f64>, endo_nbr: usize, n_varobs: usize, data: ArrayView2<'_, f64>,
) -> EstimationResult<()> {
    check_incidence_shape(incidence, endo_nbr)?;
    if data.nrows() != n_varobs {
        return Err(EstimationError::DataRowsMismatch { rows: data.nrows(), n_varobs });
    }
    Ok(())
}

/// Log-likelihood of `est_params` given `data`, using the default
/// [`CatalogBuilder`].
///
/// Parameters
/// ----------
/// - `est_params`: candidate vector in catalog order.
/// - `data`: `n_obs x n_periods` observations.
/// - `mexext`: platform extension of the compiled dynamic model.
/// - `config`: validated estimation configuration.
/// - `evaluator`: numerical backend.
///
/// # Errors
/// Catalog errors from [`CatalogBuilder::build`] and every error of
/// [`assemble`].
pub fn loglikelihood<E>(
    est_params: ArrayView1<'_, f64>, data: ArrayView2<'_, f64>, mexext: &str,
    config: &EstimationConfig, evaluator: &E,
) -> EstimationResult<f64>
where
    E: LikelihoodEvaluator + ?Sized,
{
    loglikelihood_with(&CatalogBuilder::default(), est_params, data, mexext, config, evaluator)
}

/// Same as [`loglikelihood`] with an explicit catalog builder.
///
/// # Errors
/// See [`loglikelihood`].
pub fn loglikelihood_with<E>(
    builder: &CatalogBuilder, est_params: ArrayView1<'_, f64>, data: ArrayView2<'_, f64>,
    mexext: &str, config: &EstimationConfig, evaluator: &E,
) -> EstimationResult<f64>
where
    E: LikelihoodEvaluator + ?Sized,
{
    let model = &config.model;
    check_shapes(model.lead_lag_incidence.view(), model.endo_nbr, config.options.n_varobs(), data)?;
    let catalog = builder.build(&config.estim_params, data.ncols())?;
    let structural = StructuralInputs::from_config(config)?;

    let inputs = AssemblyInputs {
        dynamic_artifact: dynamic_artifact_path(&model.fname, mexext),
        endo_nbr: model.endo_nbr,
        exo_nbr: model.exo_nbr,
        incidence: model.lead_lag_incidence.view(),
        varobs: config.options.varobs(),
        tolerances: config.options.tolerances,
        structural,
        est_params: est_params.reborrow(),
        catalog,
        data: data.reborrow(),
    };
    assemble(inputs, evaluator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::{
        catalog::{EstimatedParamsTables, EstimationSubsample},
        model::{
            config::{EstimationOptions, EstimationResults, ModelDescription},
            evaluator::EvaluatorOutput,
        },
    };
    use ndarray::{Array1, Array2, array};
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation order and error kinds of `assemble`.
    // - The content of the bundle seen by the evaluator.
    // - Pass-through of the evaluator's value and status.
    //
    // They intentionally DO NOT cover:
    // - Any numerical solution of the model; evaluators here are test doubles.
    // -------------------------------------------------------------------------

    /// Keeps a copy of the last problem it was given.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Option<(PathBuf, VariablePartition, Array2<f64>, bool)>>,
    }

    impl LikelihoodEvaluator for Recording {
        fn compute(&self, problem: &LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput> {
            let mut seen = self.seen.lock().unwrap();
            *seen = Some((
                problem.dynamic_artifact.clone(),
                problem.partition.clone(),
                problem.structural.h.clone(),
                problem.diffuse,
            ));
            Ok(EvaluatorOutput::success(-42.0))
        }
    }

    fn sum_of_data(problem: &LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput> {
        Ok(EvaluatorOutput::success(problem.data.sum()))
    }

    fn config(h: Array2<f64>) -> EstimationConfig {
        let model = ModelDescription::new(
            "rbc",
            3,
            1,
            1,
            array![[1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 0.0, 1.0]],
            array![0.99],
            array![[0.01]],
            h,
        )
        .unwrap();
        let options =
            EstimationOptions::new(SolverTolerances::default(), array![[1.0, 3.0]].view()).unwrap();
        EstimationConfig::new(
            model,
            options,
            EstimatedParamsTables::empty(),
            EstimationResults::new(Array1::zeros(3)),
        )
        .unwrap()
    }

    fn inputs<'a>(
        incidence: ArrayView2<'a, f64>, varobs: &'a [usize], data: ArrayView2<'a, f64>,
    ) -> AssemblyInputs<'a> {
        AssemblyInputs {
            dynamic_artifact: dynamic_artifact_path("rbc", ".so"),
            endo_nbr: 3,
            exo_nbr: 1,
            incidence,
            varobs,
            tolerances: SolverTolerances::default(),
            structural: StructuralInputs::new(
                Array1::zeros(3),
                array![0.99],
                array![[0.01]],
                array![[0.0]],
                varobs.len(),
            )
            .unwrap(),
            est_params: ArrayView1::from(&[] as &[f64]),
            catalog: EstimatedParametersDescription::new(
                vec![EstimationSubsample::new(0, data.ncols().saturating_sub(1)).unwrap()],
                vec![],
            )
            .unwrap(),
            data,
        }
    }

    #[test]
    // Purpose
    // -------
    // The artifact name is `fname + "_dynamic" + mexext`.
    //
    // Given
    // -----
    // - `fname = "rbc"`, `mexext = ".mexa64"`.
    //
    // Expect
    // ------
    // - `rbc_dynamic.mexa64`.
    fn artifact_path_appends_dynamic_suffix() {
        assert_eq!(dynamic_artifact_path("rbc", ".mexa64"), PathBuf::from("rbc_dynamic.mexa64"));
    }

    #[test]
    // Purpose
    // -------
    // The evaluator sees the partition, the expanded H and diffuse = false,
    // and its value is returned unmodified.
    //
    // Given
    // -----
    // - Three-variable model, two observables, H shorthand `[[0]]`.
    //
    // Expect
    // ------
    // - Result -42, artifact `rbc_dynamic.so`, partition (back [0], static
    //   [1], fwd [2]), H = zeros(2, 2).
    fn evaluator_receives_assembled_problem() {
        let cfg = config(array![[0.0]]);
        let data = Array2::<f64>::ones((2, 5));
        let recorder = Recording::default();

        let ll = loglikelihood(ArrayView1::from(&[] as &[f64]), data.view(), ".so", &cfg, &recorder).unwrap();

        assert_eq!(ll, -42.0);
        let (artifact, partition, h, diffuse) = recorder.seen.lock().unwrap().take().unwrap();
        assert_eq!(artifact, PathBuf::from("rbc_dynamic.so"));
        assert_eq!(partition.backward(), &[0]);
        assert_eq!(partition.statics(), &[1]);
        assert_eq!(partition.forward(), &[2]);
        assert_eq!(h, Array2::<f64>::zeros((2, 2)));
        assert!(!diffuse);
    }

    #[test]
    // Purpose
    // -------
    // The H shorthand and an explicit zero matrix give the evaluator the same
    // input.
    //
    // Given
    // -----
    // - Two configurations differing only in H: `[[0]]` vs zeros(2, 2).
    //
    // Expect
    // ------
    // - Identical recorded problems.
    fn zero_shorthand_and_explicit_zero_h_are_equivalent() {
        let data = Array2::<f64>::ones((2, 4));
        let short = Recording::default();
        let explicit = Recording::default();

        loglikelihood(ArrayView1::from(&[] as &[f64]), data.view(), ".so", &config(array![[0.0]]), &short)
            .unwrap();
        loglikelihood(
            ArrayView1::from(&[] as &[f64]),
            data.view(),
            ".so",
            &config(Array2::zeros((2, 2))),
            &explicit,
        )
        .unwrap();

        assert_eq!(*short.seen.lock().unwrap(), *explicit.seen.lock().unwrap());
    }

    #[test]
    // Purpose
    // -------
    // A 2-row incidence matrix aborts before the evaluator runs.
    //
    // Given
    // -----
    // - Incidence 2 x 3.
    //
    // Expect
    // ------
    // - `IncidenceShape`, evaluator never called.
    fn two_row_incidence_aborts() {
        let lli = Array2::<f64>::ones((2, 3));
        let data = Array2::<f64>::ones((1, 3));
        let varobs = [0];
        let recorder = Recording::default();

        let err = assemble(inputs(lli.view(), &varobs, data.view()), &recorder).unwrap_err();

        assert_eq!(err, EstimationError::IncidenceShape { rows: 2, cols: 3, endo_nbr: 3 });
        assert!(recorder.seen.lock().unwrap().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Data rows must match the number of observed variables.
    //
    // Given
    // -----
    // - Two observables, data with three rows.
    //
    // Expect
    // ------
    // - `DataRowsMismatch { rows: 3, n_varobs: 2 }`.
    fn data_row_mismatch_aborts() {
        let cfg = config(array![[0.0]]);
        let data = Array2::<f64>::ones((3, 4));

        let err = loglikelihood(ArrayView1::from(&[] as &[f64]), data.view(), ".so", &cfg, &sum_of_data)
            .unwrap_err();

        assert_eq!(err, EstimationError::DataRowsMismatch { rows: 3, n_varobs: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Function items are evaluators and their value is passed through.
    //
    // Given
    // -----
    // - `sum_of_data` over a 1 x 3 data block `[1, 2, 3]`.
    //
    // Expect
    // ------
    // - Result 6.
    fn function_evaluator_value_is_returned() {
        let lli = array![[1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 0.0, 1.0]];
        let data = array![[1.0, 2.0, 3.0]];
        let varobs = [1];

        let ll = assemble(inputs(lli.view(), &varobs, data.view()), &sum_of_data).unwrap();

        assert_eq!(ll, 6.0);
    }

    #[test]
    // Purpose
    // -------
    // Evaluator failures surface with their info code.
    //
    // Given
    // -----
    // - An evaluator returning `info = 3`.
    //
    // Expect
    // ------
    // - `EvaluatorFailed { info: 3, .. }`.
    fn evaluator_failure_is_surfaced() {
        fn blanchard_kahn_failure(_: &LikelihoodProblem<'_>) -> EstimationResult<EvaluatorOutput> {
            Ok(EvaluatorOutput::failure(3))
        }
        let cfg = config(array![[0.0]]);
        let data = Array2::<f64>::ones((2, 4));

        let err = loglikelihood(
            ArrayView1::from(&[] as &[f64]),
            data.view(),
            ".so",
            &cfg,
            &blanchard_kahn_failure,
        )
        .unwrap_err();

        assert!(matches!(err, EstimationError::EvaluatorFailed { info: 3, .. }));
    }

    #[test]
    // Purpose
    // -------
    // An empty sample cannot be scored.
    //
    // Given
    // -----
    // - Data with two rows and zero columns.
    //
    // Expect
    // ------
    // - `EmptySample`.
    fn empty_sample_is_rejected() {
        let cfg = config(array![[0.0]]);
        let data = Array2::<f64>::zeros((2, 0));

        let err = loglikelihood(ArrayView1::from(&[] as &[f64]), data.view(), ".so", &cfg, &sum_of_data)
            .unwrap_err();

        assert_eq!(err, EstimationError::EmptySample);
    }

    #[test]
    // Purpose
    // -------
    // Shape checks run before the catalog is built, so a mis-shaped empty
    // block reports the row mismatch rather than the empty sample.
    //
    // Given
    // -----
    // - Two observables, data with three rows and zero columns.
    //
    // Expect
    // ------
    // - `DataRowsMismatch { rows: 3, n_varobs: 2 }`.
    fn row_mismatch_is_reported_before_empty_sample() {
        let cfg = config(array![[0.0]]);
        let data = Array2::<f64>::zeros((3, 0));

        let err = loglikelihood(ArrayView1::from(&[] as &[f64]), data.view(), ".so", &cfg, &sum_of_data)
            .unwrap_err();

        assert_eq!(err, EstimationError::DataRowsMismatch { rows: 3, n_varobs: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Caller views with lifetimes shorter than the configuration's are
    // accepted.
    //
    // Given
    // -----
    // - A long-lived config; theta and data created in an inner scope.
    //
    // Expect
    // ------
    // - Result equals the sum of the data (6).
    fn short_lived_views_are_accepted() {
        let cfg = config(array![[0.0]]);
        let ll = {
            let theta = Array1::<f64>::zeros(2);
            let data = array![[1.0, 2.0], [3.0, 0.0]];
            loglikelihood(theta.view(), data.view(), ".so", &cfg, &sum_of_data)
        };

        assert_eq!(ll, Ok(6.0));
    }
}
