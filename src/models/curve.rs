//! Parametric curve abstraction consumed by the least-squares solver.

/// A scalar model `f(x; p)` with an analytic gradient in `p`.
///
/// Implementations must be pure: evaluation depends only on `x` and `p`.
pub trait CurveModel: Sync {
    /// Parameter names, in the order `p` is laid out.
    fn param_names(&self) -> &'static [&'static str];

    fn eval(&self, x: f64, p: &[f64]) -> f64;

    /// Write `∂f/∂p_j` into `out[j]`.
    fn gradient(&self, x: f64, p: &[f64], out: &mut [f64]);

    fn param_len(&self) -> usize {
        self.param_names().len()
    }
}
