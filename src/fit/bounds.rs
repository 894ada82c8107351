//! Box constraints for an unconstrained least-squares solver.
//!
//! The solver iterates on unbounded "internal" values; each bounded parameter
//! is mapped to its external value with the MINUIT-style transforms:
//!
//! ```text
//! [min, max]:  ext = min + (sin(int) + 1) · (max − min) / 2
//! [min, ∞):    ext = min − 1 + sqrt(int² + 1)
//! (−∞, max]:   ext = max + 1 − sqrt(int² + 1)
//! (−∞, ∞):     ext = int
//! ```
//!
//! so every external value the model ever sees is inside its bounds.

use crate::domain::ModelParameter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Free,
    Lower(f64),
    Upper(f64),
    Both(f64, f64),
}

impl Transform {
    pub fn for_bounds(min: f64, max: f64) -> Self {
        match (min.is_finite(), max.is_finite()) {
            (true, true) => Transform::Both(min, max),
            (true, false) => Transform::Lower(min),
            (false, true) => Transform::Upper(max),
            (false, false) => Transform::Free,
        }
    }

    /// External (bounded) value for an internal value.
    pub fn to_external(self, int: f64) -> f64 {
        match self {
            Transform::Free => int,
            Transform::Lower(min) => min - 1.0 + (int * int + 1.0).sqrt(),
            Transform::Upper(max) => max + 1.0 - (int * int + 1.0).sqrt(),
            Transform::Both(min, max) => min + (int.sin() + 1.0) * (max - min) / 2.0,
        }
    }

    /// Internal value for an external value (clamped into bounds first).
    pub fn to_internal(self, ext: f64) -> f64 {
        match self {
            Transform::Free => ext,
            Transform::Lower(min) => {
                let v = ext.max(min) - min + 1.0;
                (v * v - 1.0).sqrt()
            }
            Transform::Upper(max) => {
                let v = max - ext.min(max) + 1.0;
                (v * v - 1.0).sqrt()
            }
            Transform::Both(min, max) => {
                if max <= min {
                    return 0.0;
                }
                let u = 2.0 * (ext.clamp(min, max) - min) / (max - min) - 1.0;
                u.clamp(-1.0, 1.0).asin()
            }
        }
    }

    /// `d ext / d int`, for chaining the model gradient.
    pub fn derivative(self, int: f64) -> f64 {
        match self {
            Transform::Free => 1.0,
            Transform::Lower(_) => int / (int * int + 1.0).sqrt(),
            Transform::Upper(_) => -int / (int * int + 1.0).sqrt(),
            Transform::Both(min, max) => int.cos() * (max - min) / 2.0,
        }
    }
}

/// Transforms for a whole parameter list plus its internal starting point.
#[derive(Debug, Clone)]
pub struct BoundedParams {
    pub transforms: Vec<Transform>,
    pub internal: Vec<f64>,
}

impl BoundedParams {
    pub fn new(params: &[ModelParameter]) -> Self {
        let transforms: Vec<Transform> = params
            .iter()
            .map(|p| Transform::for_bounds(p.min, p.max))
            .collect();
        let internal = params
            .iter()
            .zip(transforms.iter())
            .map(|(p, t)| t.to_internal(p.value))
            .collect();
        Self { transforms, internal }
    }

    pub fn external(&self, internal: &[f64]) -> Vec<f64> {
        internal
            .iter()
            .zip(self.transforms.iter())
            .map(|(&v, t)| t.to_external(v))
            .collect()
    }
}
