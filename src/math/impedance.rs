//! Reflection coefficient to normalized impedance.
//!
//! `z = (1 + Γ) / (1 − Γ)` is the quantity read off a Smith chart; multiply by
//! the reference impedance `z0` to get ohms.

use nalgebra::Complex;

use crate::error::AppError;
use crate::math::truncate::nearest_index;

/// Normalized impedance for a single reflection coefficient.
///
/// `Γ = 1` (open circuit) yields a non-finite value.
pub fn normalized_impedance(gamma: Complex<f64>) -> Complex<f64> {
    let one = Complex::new(1.0, 0.0);
    (one + gamma) / (one - gamma)
}

/// Impedance in ohms at the sample nearest `f0`.
///
/// `freq` and `f0` must share units.
pub fn impedance_at(freq: &[f64], gamma: &[Complex<f64>], f0: f64, z0: f64) -> Result<Complex<f64>, AppError> {
    if freq.is_empty() || freq.len() != gamma.len() {
        return Err(AppError::precondition(format!(
            "Impedance lookup needs equal, non-empty traces ({} freq vs {} gamma).",
            freq.len(),
            gamma.len()
        )));
    }
    let idx = nearest_index(freq, f0)
        .ok_or_else(|| AppError::precondition("Frequency trace has no comparable values."))?;
    Ok(normalized_impedance(gamma[idx]) * z0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_load_is_unity() {
        let z = normalized_impedance(Complex::new(0.0, 0.0));
        assert!((z.re - 1.0).abs() < 1e-12 && z.im.abs() < 1e-12);
    }

    #[test]
    fn short_and_open() {
        let z = normalized_impedance(Complex::new(-1.0, 0.0));
        assert!(z.norm() < 1e-12);
        let z = normalized_impedance(Complex::new(1.0, 0.0));
        assert!(!z.re.is_finite() || !z.im.is_finite());
    }

    #[test]
    fn picks_nearest_sample_and_scales() {
        let freq = [7.0, 8.0, 9.0];
        let gamma = [
            Complex::new(0.5, 0.0),
            Complex::new(1.0 / 3.0, 0.0),
            Complex::new(0.0, 0.0),
        ];
        // Γ = 1/3 -> z = 2 -> 100 Ω at z0 = 50.
        let z = impedance_at(&freq, &gamma, 8.2, 50.0).unwrap();
        assert!((z.re - 100.0).abs() < 1e-9);
        assert!(z.im.abs() < 1e-9);
    }

    #[test]
    fn mismatched_traces_fail() {
        assert!(impedance_at(&[1.0], &[], 1.0, 50.0).is_err());
    }
}
