//! Reporting utilities: per-dataset results, annotation labels and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use nalgebra::Complex;

use crate::domain::{FreqUnit, ResonanceFit};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Everything known about one dataset after a fit run.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub name: String,
    pub fit: Result<ResonanceFit, AppError>,
    /// Impedance in ohms at the fitted center, when a complex reflection trace exists.
    pub impedance: Option<Complex<f64>>,
}

/// Legend-style label for a fitted curve overlay.
pub fn fit_label(name: &str, fit: &ResonanceFit, unit: FreqUnit) -> String {
    format!(
        "Fit {name}\nCenter={:.2} {}\nQ={:.0}",
        fit.params.center,
        unit.label(),
        fit.q
    )
}

/// Label for a center-frequency marker on an impedance panel.
pub fn impedance_label(fit: &ResonanceFit, z: Complex<f64>, unit: FreqUnit) -> String {
    format!(
        "{:.2} {}\nZ={} Ω",
        fit.params.center,
        unit.label(),
        format_complex(z)
    )
}

/// `a+bj` with two decimals.
pub fn format_complex(z: Complex<f64>) -> String {
    let sign = if z.im < 0.0 { '-' } else { '+' };
    format!("{:.2}{sign}{:.2}j", z.re, z.im.abs())
}
