//! Lorentzian dip on a constant background.
//!
//! ```text
//! f(x) = (A / π) · σ / ((x − c)² + σ²) + b
//! ```
//!
//! `A` is the signed area (negative for a reflection dip), `σ` the half width
//! at half maximum, `c` the center and `b` the baseline level. The peak
//! height of the Lorentzian term is `A / (π σ)`.
//!
//! Seeding policy (applied to the fit window only):
//! - `c`: coordinate of the minimum response, bounded by the window ends
//! - `σ`: fixed heuristic seed and bounds from `FitOptions` (0.1 in `[0.001, 1]`)
//! - `A`: unbounded, seeded at 1.0
//! - `b`: maximum response; with `BaselinePolicy::DbReflection` bounded by
//!   `[min(y)/2, 0]`, which assumes dB-scale data sitting at or below 0 dB

use std::f64::consts::PI;

use crate::domain::{BaselinePolicy, ExtremumKind, FitOptions, ModelParameter, ResonanceParams};
use crate::error::AppError;
use crate::math::arg_extremum;
use crate::models::CurveModel;

pub const PARAM_NAMES: [&str; 4] = ["center", "sigma", "amplitude", "background"];

/// Amplitude seed when nothing better is known.
pub const AMPLITUDE_SEED: f64 = 1.0;

/// The resonance model.
#[derive(Debug, Clone, Copy, Default)]
pub struct LorentzianConstBg;

impl CurveModel for LorentzianConstBg {
    fn param_names(&self) -> &'static [&'static str] {
        &PARAM_NAMES
    }

    fn eval(&self, x: f64, p: &[f64]) -> f64 {
        lorentzian(x, p[0], p[1], p[2]) + p[3]
    }

    fn gradient(&self, x: f64, p: &[f64], out: &mut [f64]) {
        let (center, sigma, amplitude) = (p[0], p[1], p[2]);
        let d = x - center;
        let den = d * d + sigma * sigma;
        let den2 = den * den;
        let a = amplitude / PI;

        out[0] = a * sigma * 2.0 * d / den2;
        out[1] = a * (d * d - sigma * sigma) / den2;
        out[2] = sigma / (PI * den);
        out[3] = 1.0;
    }
}

/// Area-normalized Lorentzian.
pub fn lorentzian(x: f64, center: f64, sigma: f64, amplitude: f64) -> f64 {
    let d = x - center;
    amplitude / PI * sigma / (d * d + sigma * sigma)
}

/// Evaluate the full model for a fitted parameter set.
pub fn predict(params: &ResonanceParams, x: f64) -> f64 {
    lorentzian(x, params.center, params.sigma, params.amplitude) + params.background
}

/// Build the seeded, bounded parameter list for a fit window.
pub fn seed_parameters(x: &[f64], y: &[f64], opts: &FitOptions) -> Result<Vec<ModelParameter>, AppError> {
    if x.is_empty() || x.len() != y.len() {
        return Err(AppError::precondition(format!(
            "Cannot seed resonance parameters from {} x / {} y samples.",
            x.len(),
            y.len()
        )));
    }

    let i_min = arg_extremum(y, ExtremumKind::Min)
        .ok_or_else(|| AppError::precondition("Fit window has no finite response values."))?;
    let i_max = arg_extremum(y, ExtremumKind::Max)
        .ok_or_else(|| AppError::precondition("Fit window has no finite response values."))?;
    let y_min = y[i_min];
    let y_max = y[i_max];

    let (x_first, x_last) = (x[0], x[x.len() - 1]);

    let center = ModelParameter::bounded("center", x[i_min], x_first, x_last)?;
    let sigma = ModelParameter::bounded("sigma", opts.sigma_init, opts.sigma_min, opts.sigma_max)?;
    let amplitude = ModelParameter::unbounded("amplitude", AMPLITUDE_SEED);
    let background = match opts.baseline {
        BaselinePolicy::DbReflection => {
            ModelParameter::bounded("background", y_max, y_min / 2.0, 0.0).map_err(|_| {
                AppError::precondition(format!(
                    "Background bounds [{}, 0] are empty; the dB baseline policy needs responses at or below 0 dB.",
                    y_min / 2.0
                ))
            })?
        }
        BaselinePolicy::Free => ModelParameter::unbounded("background", y_max),
    };

    Ok(vec![center, sigma, amplitude, background])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_height_matches_area_normalization() {
        let v = lorentzian(5.0, 5.0, 0.2, -3.0);
        assert!((v - (-3.0 / (PI * 0.2))).abs() < 1e-12);
        // Half maximum at one sigma away.
        let half = lorentzian(5.2, 5.0, 0.2, -3.0);
        assert!((half - v / 2.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let model = LorentzianConstBg;
        let p = [5.0, 0.2, -3.0, -0.1];
        let mut g = [0.0; 4];
        for &x in &[4.7, 4.95, 5.0, 5.3] {
            model.gradient(x, &p, &mut g);
            for j in 0..4 {
                let h = 1e-6;
                let mut hi = p;
                let mut lo = p;
                hi[j] += h;
                lo[j] -= h;
                let fd = (model.eval(x, &hi) - model.eval(x, &lo)) / (2.0 * h);
                assert!((fd - g[j]).abs() < 1e-5, "x={x} j={j} fd={fd} g={}", g[j]);
            }
        }
    }

    #[test]
    fn seeds_follow_window_policy() {
        let x = [7.0, 7.5, 8.0, 8.5, 9.0];
        let y = [-1.0, -3.0, -12.0, -2.5, -0.5];
        let params = seed_parameters(&x, &y, &FitOptions::default()).unwrap();

        assert_eq!(params[0].value, 8.0);
        assert_eq!((params[0].min, params[0].max), (7.0, 9.0));
        assert_eq!(params[1].value, 0.1);
        assert_eq!((params[1].min, params[1].max), (0.001, 1.0));
        assert_eq!(params[2].value, AMPLITUDE_SEED);
        assert!(params[2].min.is_infinite() && params[2].max.is_infinite());
        assert_eq!(params[3].value, -0.5);
        assert_eq!((params[3].min, params[3].max), (-6.0, 0.0));
    }

    #[test]
    fn positive_responses_violate_db_policy_but_not_free() {
        let x = [1.0, 2.0, 3.0];
        let y = [0.9, 0.2, 0.8];
        let err = seed_parameters(&x, &y, &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Precondition);

        let opts = FitOptions {
            baseline: BaselinePolicy::Free,
            ..FitOptions::default()
        };
        let params = seed_parameters(&x, &y, &opts).unwrap();
        assert_eq!(params[3].value, 0.9);
    }
}
