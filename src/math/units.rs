//! Frequency and magnitude unit conversions.

use nalgebra::Complex;

use crate::domain::{FreqUnit, Scale};

/// Convert a frequency array from Hz to `unit`.
pub fn to_unit(freq_hz: &[f64], unit: FreqUnit) -> Vec<f64> {
    let d = unit.divisor();
    freq_hz.iter().map(|f| f / d).collect()
}

/// `20·log10(mag)`. Zero magnitude maps to `-inf`.
pub fn mag_to_db(mag: f64) -> f64 {
    20.0 * mag.log10()
}

/// Inverse of [`mag_to_db`].
pub fn db_to_mag(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Express complex S-parameter samples on the requested scale.
pub fn complex_to_scale(values: &[Complex<f64>], scale: Scale) -> Vec<f64> {
    values
        .iter()
        .map(|s| match scale {
            Scale::Db => mag_to_db(s.norm()),
            Scale::Linear => s.norm(),
        })
        .collect()
}

/// Express dB magnitudes on the requested scale.
pub fn db_to_scale(values: &[f64], scale: Scale) -> Vec<f64> {
    match scale {
        Scale::Db => values.to_vec(),
        Scale::Linear => values.iter().map(|&v| db_to_mag(v)).collect(),
    }
}
