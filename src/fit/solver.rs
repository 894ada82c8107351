//! Nonlinear least-squares seam.
//!
//! The resonance fitter only needs "minimize Σ (f(x_i; p) − y_i)² subject to
//! box bounds". `LeastSquaresSolver` is that contract; `LmSolver` fulfils it
//! with the `levenberg-marquardt` crate, handling bounds through the
//! transforms in `fit::bounds`.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use log::debug;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::domain::ModelParameter;
use crate::error::AppError;
use crate::fit::bounds::{BoundedParams, Transform};
use crate::models::CurveModel;

/// Result of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    /// Best-fit external parameter values, in the model's parameter order.
    pub values: Vec<f64>,
    /// Model evaluated at each observed `x`.
    pub best_fit: Vec<f64>,
    /// Sum of squared residuals at the optimum.
    pub sse: f64,
    pub evaluations: usize,
}

/// A bounded nonlinear least-squares engine.
pub trait LeastSquaresSolver: Sync {
    fn solve(
        &self,
        model: &dyn CurveModel,
        params: &[ModelParameter],
        x: &[f64],
        y: &[f64],
    ) -> Result<SolverOutcome, AppError>;
}

/// Levenberg–Marquardt with MINUIT-style bound transforms.
#[derive(Debug, Clone, Copy)]
pub struct LmSolver {
    pub ftol: f64,
    pub xtol: f64,
    /// Evaluation budget is `patience · (n_params + 1)`.
    pub patience: usize,
}

impl Default for LmSolver {
    fn default() -> Self {
        Self {
            ftol: 1.5e-8,
            xtol: 1.5e-8,
            patience: 200,
        }
    }
}

struct CurveProblem<'a> {
    model: &'a dyn CurveModel,
    x: &'a [f64],
    y: &'a [f64],
    transforms: &'a [Transform],
    internal: DVector<f64>,
}

impl CurveProblem<'_> {
    fn external(&self) -> Vec<f64> {
        self.internal
            .iter()
            .zip(self.transforms.iter())
            .map(|(&v, t)| t.to_external(v))
            .collect()
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for CurveProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, p: &DVector<f64>) {
        self.internal.copy_from(p);
    }

    fn params(&self) -> DVector<f64> {
        self.internal.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let p = self.external();
        let r = DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(self.y.iter())
                .map(|(&xi, &yi)| self.model.eval(xi, &p) - yi),
        );
        if r.iter().all(|v| v.is_finite()) { Some(r) } else { None }
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let p = self.external();
        let n_params = p.len();
        let scale: Vec<f64> = self
            .internal
            .iter()
            .zip(self.transforms.iter())
            .map(|(&v, t)| t.derivative(v))
            .collect();

        let mut jac = DMatrix::<f64>::zeros(self.x.len(), n_params);
        let mut row = vec![0.0; n_params];
        for (i, &xi) in self.x.iter().enumerate() {
            self.model.gradient(xi, &p, &mut row);
            for j in 0..n_params {
                jac[(i, j)] = row[j] * scale[j];
            }
        }
        if jac.iter().all(|v| v.is_finite()) { Some(jac) } else { None }
    }
}

impl LeastSquaresSolver for LmSolver {
    fn solve(
        &self,
        model: &dyn CurveModel,
        params: &[ModelParameter],
        x: &[f64],
        y: &[f64],
    ) -> Result<SolverOutcome, AppError> {
        let n_params = model.param_len();
        if params.len() != n_params {
            return Err(AppError::invalid_argument(format!(
                "Model expects {n_params} parameters, got {}.",
                params.len()
            )));
        }
        if x.len() != y.len() {
            return Err(AppError::precondition(format!(
                "Coordinate and response lengths differ ({} vs {}).",
                x.len(),
                y.len()
            )));
        }
        if x.len() < n_params {
            return Err(AppError::fit_failure(format!(
                "Need at least {n_params} samples to fit {n_params} parameters, got {}.",
                x.len()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(AppError::fit_failure("Fit data contains non-finite values."));
        }

        let bounded = BoundedParams::new(params);
        let problem = CurveProblem {
            model,
            x,
            y,
            transforms: &bounded.transforms,
            internal: DVector::from_vec(bounded.internal.clone()),
        };

        let (problem, report) = LevenbergMarquardt::new()
            .with_ftol(self.ftol)
            .with_xtol(self.xtol)
            .with_patience(self.patience)
            .minimize(problem);

        debug!(
            "lm: termination={:?} evaluations={} objective={:.6e}",
            report.termination, report.number_of_evaluations, report.objective_function
        );

        let accepted = report.termination.was_successful()
            || matches!(report.termination, TerminationReason::NoImprovementPossible(_));
        if !accepted {
            return Err(AppError::fit_failure(format!(
                "Solver did not converge: {:?} after {} evaluations.",
                report.termination, report.number_of_evaluations
            )));
        }

        let values = bounded.external(problem.internal.as_slice());
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::fit_failure(format!(
                "Solver returned non-finite parameters: {values:?}"
            )));
        }

        let best_fit: Vec<f64> = x.iter().map(|&xi| model.eval(xi, &values)).collect();
        let sse: f64 = best_fit
            .iter()
            .zip(y.iter())
            .map(|(f, yi)| (f - yi) * (f - yi))
            .sum();
        if !sse.is_finite() {
            return Err(AppError::fit_failure("Fit produced a non-finite residual sum."));
        }

        Ok(SolverOutcome {
            values,
            best_fit,
            sse,
            evaluations: report.number_of_evaluations,
        })
    }
}
