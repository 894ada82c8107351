//! Resonance fitting orchestration.
//!
//! truncate → seed from the window → solve → derive `Q = center / sigma` →
//! package the model curve on the window coordinates for overlay plotting.
//!
//! Nothing here catches or logs-and-continues: every failure is returned to
//! the caller.

use log::debug;

use crate::domain::{CurveSamples, FitOptions, FitRange, ResonanceFit, ResonanceParams};
use crate::error::AppError;
use crate::fit::solver::{LeastSquaresSolver, LmSolver};
use crate::math::select_window;
use crate::models::{LorentzianConstBg, seed_parameters};

/// Fit with the default Levenberg–Marquardt solver.
pub fn fit_resonance(x: &[f64], y: &[f64], range: &FitRange, opts: &FitOptions) -> Result<ResonanceFit, AppError> {
    fit_resonance_with(&LmSolver::default(), x, y, range, opts)
}

/// Fit a Lorentzian dip on a constant background to `(x, y)` within `range`.
pub fn fit_resonance_with(
    solver: &dyn LeastSquaresSolver,
    x: &[f64],
    y: &[f64],
    range: &FitRange,
    opts: &FitOptions,
) -> Result<ResonanceFit, AppError> {
    validate_range(range)?;
    validate_options(opts)?;

    let window = select_window(x, y, range)?;
    if window.is_empty() {
        return Err(AppError::fit_failure(format!(
            "Fit range {range} selects no samples."
        )));
    }

    let params = seed_parameters(window.x, window.y, opts)?;
    debug!(
        "resonance seeds over {} samples (offset {}): {:?}",
        window.len(),
        window.offset,
        params
    );

    let outcome = solver.solve(&LorentzianConstBg, &params, window.x, window.y)?;
    let [center, sigma, amplitude, background] = outcome.values[..] else {
        return Err(AppError::fit_failure(format!(
            "Solver returned {} parameters, expected 4.",
            outcome.values.len()
        )));
    };
    if outcome.best_fit.len() != window.len() {
        return Err(AppError::fit_failure(format!(
            "Solver returned {} curve samples for a {}-sample window.",
            outcome.best_fit.len(),
            window.len()
        )));
    }

    let q = center / sigma;
    if !q.is_finite() {
        return Err(AppError::fit_failure(format!(
            "Q is not finite (center={center}, sigma={sigma})."
        )));
    }

    Ok(ResonanceFit {
        params: ResonanceParams {
            center,
            sigma,
            amplitude,
            background,
        },
        q,
        curve: CurveSamples {
            x: window.x.to_vec(),
            y: outcome.best_fit,
        },
        window_offset: window.offset,
        sse: outcome.sse,
        evaluations: outcome.evaluations,
    })
}

/// Reject malformed ranges before touching any data.
pub fn validate_range(range: &FitRange) -> Result<(), AppError> {
    match *range {
        FitRange::All => Ok(()),
        FitRange::Window { lo, hi } => FitRange::window(lo, hi).map(|_| ()),
    }
}

fn validate_options(opts: &FitOptions) -> Result<(), AppError> {
    let ok = opts.sigma_min.is_finite()
        && opts.sigma_max.is_finite()
        && opts.sigma_init.is_finite()
        && opts.sigma_min > 0.0
        && opts.sigma_min <= opts.sigma_max;
    if ok {
        Ok(())
    } else {
        Err(AppError::invalid_argument(format!(
            "Invalid sigma settings: init={}, bounds=[{}, {}] (need 0 < min <= max).",
            opts.sigma_init, opts.sigma_min, opts.sigma_max
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SweepSpec, generate_sweep};
    use crate::domain::ModelParameter;
    use crate::error::ErrorKind;
    use crate::fit::solver::SolverOutcome;
    use crate::models::CurveModel;

    fn reference_sweep(noise: f64) -> SweepSpec {
        SweepSpec {
            start: 0.0,
            stop: 10.0,
            points: 1001,
            center: 5.0,
            sigma: 0.2,
            amplitude: -3.0,
            background: -0.1,
            noise,
        }
    }

    struct UnreachableSolver;

    impl LeastSquaresSolver for UnreachableSolver {
        fn solve(
            &self,
            _model: &dyn CurveModel,
            _params: &[ModelParameter],
            _x: &[f64],
            _y: &[f64],
        ) -> Result<SolverOutcome, AppError> {
            panic!("solver must not run for invalid input");
        }
    }

    /// Returns the seeds unchanged, for checking how results are packaged.
    struct EchoSolver;

    impl LeastSquaresSolver for EchoSolver {
        fn solve(
            &self,
            model: &dyn CurveModel,
            params: &[ModelParameter],
            x: &[f64],
            _y: &[f64],
        ) -> Result<SolverOutcome, AppError> {
            let values: Vec<f64> = params.iter().map(|p| p.value).collect();
            let best_fit = x.iter().map(|&xi| model.eval(xi, &values)).collect();
            Ok(SolverOutcome {
                values,
                best_fit,
                sse: 0.0,
                evaluations: 1,
            })
        }
    }

    #[test]
    fn recovers_noisy_synthetic_resonance() {
        let sweep = generate_sweep(&reference_sweep(0.01), 7).unwrap();
        let fit = fit_resonance(&sweep.x, &sweep.y, &FitRange::All, &FitOptions::default()).unwrap();

        assert!((fit.params.center - 5.0).abs() / 5.0 < 0.01, "center={}", fit.params.center);
        assert!((fit.q - 25.0).abs() / 25.0 < 0.05, "q={}", fit.q);
        assert!(fit.params.amplitude < 0.0);
        assert_eq!(fit.curve.x.len(), sweep.len());
        assert_eq!(fit.curve.y.len(), sweep.len());
        assert_eq!(fit.window_offset, 0);
    }

    #[test]
    fn recovers_clean_resonance_in_explicit_window() {
        let sweep = generate_sweep(&reference_sweep(0.0), 1).unwrap();
        let range = FitRange::window(3.0, 7.0).unwrap();
        let fit = fit_resonance(&sweep.x, &sweep.y, &range, &FitOptions::default()).unwrap();

        assert!((fit.params.center - 5.0).abs() < 1e-3);
        assert!((fit.params.sigma - 0.2).abs() < 1e-3);
        assert!((fit.params.amplitude + 3.0).abs() < 1e-2);
        assert!((fit.params.background + 0.1).abs() < 1e-3);
        assert!((fit.q - fit.params.center / fit.params.sigma).abs() < 1e-12);

        // x = 0.00, 0.01, ... so [3, 7] maps to indices 300..700.
        assert_eq!(fit.window_offset, 300);
        assert_eq!(fit.curve.x.len(), 400);
        assert!((fit.curve.x[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn reversed_range_fails_before_solving() {
        let sweep = generate_sweep(&reference_sweep(0.0), 1).unwrap();
        for range in [FitRange::Window { lo: 7.0, hi: 3.0 }, FitRange::Window { lo: 4.0, hi: 4.0 }] {
            let err = fit_resonance_with(&UnreachableSolver, &sweep.x, &sweep.y, &range, &FitOptions::default())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Precondition);
        }
    }

    #[test]
    fn empty_window_is_a_fit_failure() {
        let sweep = generate_sweep(&reference_sweep(0.0), 1).unwrap();
        let range = FitRange::window(5.001, 5.002).unwrap();
        let err = fit_resonance_with(&UnreachableSolver, &sweep.x, &sweep.y, &range, &FitOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FitFailure);
    }

    #[test]
    fn empty_series_is_a_precondition_error() {
        let err = fit_resonance_with(&UnreachableSolver, &[], &[], &FitRange::All, &FitOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn bad_sigma_options_are_invalid_arguments() {
        let opts = FitOptions {
            sigma_min: 0.0,
            ..FitOptions::default()
        };
        let err = fit_resonance_with(&UnreachableSolver, &[1.0, 2.0], &[-1.0, -2.0], &FitRange::All, &opts)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn packages_solver_output() {
        let x = [7.0, 7.5, 8.0, 8.5, 9.0];
        let y = [-1.0, -3.0, -12.0, -2.5, -0.5];
        let fit = fit_resonance_with(&EchoSolver, &x, &y, &FitRange::All, &FitOptions::default()).unwrap();

        // Seeds: center at the minimum, sigma 0.1.
        assert_eq!(fit.params.center, 8.0);
        assert!((fit.q - 80.0).abs() < 1e-9);
        assert_eq!(fit.curve.x, x.to_vec());
        assert_eq!(fit.evaluations, 1);
    }
}
