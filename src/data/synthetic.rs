//! Synthetic resonance sweeps (Lorentzian dip + constant background + noise).
//!
//! Deterministic for a given seed, so they double as test fixtures.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{ResonanceParams, Series};
use crate::error::AppError;
use crate::models::predict;

/// Shape of a synthetic sweep, in coordinate units (typically GHz / dB).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSpec {
    pub start: f64,
    pub stop: f64,
    pub points: usize,
    pub center: f64,
    pub sigma: f64,
    /// Signed Lorentzian area; negative for a dip.
    pub amplitude: f64,
    pub background: f64,
    /// Standard deviation of additive Gaussian noise.
    pub noise: f64,
}

impl SweepSpec {
    pub fn params(&self) -> ResonanceParams {
        ResonanceParams {
            center: self.center,
            sigma: self.sigma,
            amplitude: self.amplitude,
            background: self.background,
        }
    }
}

pub fn generate_sweep(spec: &SweepSpec, seed: u64) -> Result<Series, AppError> {
    if spec.points < 2 {
        return Err(AppError::invalid_argument("Sweep needs at least 2 points."));
    }
    if !(spec.start.is_finite() && spec.stop.is_finite() && spec.stop > spec.start) {
        return Err(AppError::invalid_argument(format!(
            "Invalid sweep span [{}, {}].",
            spec.start, spec.stop
        )));
    }
    if !(spec.sigma.is_finite() && spec.sigma > 0.0) {
        return Err(AppError::invalid_argument("Sweep sigma must be > 0."));
    }

    let normal = Normal::new(0.0, spec.noise.max(0.0))
        .map_err(|e| AppError::invalid_argument(format!("Noise distribution error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let params = spec.params();
    let step = (spec.stop - spec.start) / (spec.points as f64 - 1.0);

    let mut x = Vec::with_capacity(spec.points);
    let mut y = Vec::with_capacity(spec.points);
    for i in 0..spec.points {
        let xi = spec.start + step * i as f64;
        let noise = if spec.noise > 0.0 { normal.sample(&mut rng) } else { 0.0 };
        x.push(xi);
        y.push(predict(&params, xi) + noise);
    }

    Series::new(x, y)
}
