//! Range truncation by nearest-sample matching.
//!
//! Each bound of `[lo, hi]` is snapped to the sample whose coordinate is
//! closest in absolute distance (not the first sample `>=` the bound). The
//! window then runs from the `lo` sample up to, but excluding, the `hi` sample.
//!
//! Conventions:
//! - ties on exact equidistance resolve to the lower index
//! - the upper bound is exclusive, except that a bound at or past the final
//!   coordinate reaches the end of the series, so a window covering the whole
//!   coordinate range is the identity
//! - a window narrower than the sample spacing is empty; callers decide
//!   whether that is an error
//!
//! The returned `offset` is the index of the first window sample in the
//! untruncated series, so local indices can be mapped back without a value
//! lookup.

use crate::domain::{FitRange, check_series};
use crate::error::AppError;

/// A borrowed sub-range of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    /// Index of `x[0]` in the original series.
    pub offset: usize,
}

impl Window<'_> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Map a window-local index to the original series.
    pub fn original_index(&self, local: usize) -> usize {
        self.offset + local
    }
}

/// Index of the sample closest to `target`. Ties go to the lower index.
///
/// Returns `None` for an empty slice or when every coordinate is NaN.
pub fn nearest_index(x: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &xi) in x.iter().enumerate() {
        let d = (xi - target).abs();
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Truncate `(x, y)` to the samples nearest `[lo, hi]`.
///
/// `hi <= lo` is rejected outright rather than producing a reversed slice.
pub fn truncate<'a>(x: &'a [f64], y: &'a [f64], lo: f64, hi: f64) -> Result<Window<'a>, AppError> {
    check_series(x, y)?;
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(AppError::invalid_argument(format!(
            "Truncation bounds must be finite (got [{lo}, {hi}])."
        )));
    }
    if hi <= lo {
        return Err(AppError::precondition(format!(
            "Truncation upper bound must exceed lower bound (got [{lo}, {hi}])."
        )));
    }

    let lo_idx = nearest_index(x, lo)
        .ok_or_else(|| AppError::precondition("Series has no comparable coordinates."))?;
    let hi_idx = nearest_index(x, hi)
        .ok_or_else(|| AppError::precondition("Series has no comparable coordinates."))?;

    // Keyed on the coordinate: a repeated final coordinate must not stop short.
    let end = if hi >= x[x.len() - 1] { x.len() } else { hi_idx };
    // Only reachable with unsorted coordinates; keep the slice well-formed.
    let end = end.max(lo_idx);

    Ok(Window {
        x: &x[lo_idx..end],
        y: &y[lo_idx..end],
        offset: lo_idx,
    })
}

/// Resolve a `FitRange` to a window over `(x, y)`.
pub fn select_window<'a>(x: &'a [f64], y: &'a [f64], range: &FitRange) -> Result<Window<'a>, AppError> {
    match *range {
        FitRange::All => {
            check_series(x, y)?;
            Ok(Window { x, y, offset: 0 })
        }
        FitRange::Window { lo, hi } => truncate(x, y, lo, hi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ramp(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 10.0).collect();
        (x, y)
    }

    #[test]
    fn truncates_to_nearest_samples_with_exclusive_upper() {
        let (x, y) = ramp(10);
        let w = truncate(&x, &y, 2.0, 5.0).unwrap();
        assert_eq!(w.x, &[2.0, 3.0, 4.0]);
        assert_eq!(w.y, &[20.0, 30.0, 40.0]);
        assert_eq!(w.offset, 2);
    }

    #[test]
    fn bounds_snap_to_closest_not_first_greater() {
        let (x, y) = ramp(10);
        // 2.4 snaps down to 2, 6.6 snaps up to 7.
        let w = truncate(&x, &y, 2.4, 6.6).unwrap();
        assert_eq!(w.x.first().copied(), Some(2.0));
        assert_eq!(w.x.last().copied(), Some(6.0));
    }

    #[test]
    fn covering_window_is_identity() {
        let (x, y) = ramp(10);
        let w = truncate(&x, &y, -5.0, 100.0).unwrap();
        assert_eq!(w.x, x.as_slice());
        assert_eq!(w.y, y.as_slice());

        let w = truncate(&x, &y, 0.0, 9.0).unwrap();
        assert_eq!(w.len(), 10);

        // Repeated final coordinate: the nearest-index tie lands on the first copy.
        let x = [0.0, 1.0, 2.0, 2.0];
        let y = [-1.0, -2.0, -3.0, -9.0];
        let w = truncate(&x, &y, -10.0, 10.0).unwrap();
        assert_eq!(w.x, &x[..]);
        assert_eq!(w.y, &y[..]);
        let w = truncate(&x, &y, 0.0, 2.0).unwrap();
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn ties_resolve_to_lower_index() {
        let x = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(nearest_index(&x, 1.5), Some(1));
        assert_eq!(nearest_index(&[], 1.5), None);
    }

    #[test]
    fn narrow_window_is_empty() {
        let (x, y) = ramp(10);
        let w = truncate(&x, &y, 3.1, 3.2).unwrap();
        assert!(w.is_empty());
        assert_eq!(w.offset, 3);
    }

    #[test]
    fn reversed_or_degenerate_bounds_fail() {
        let (x, y) = ramp(10);
        let err = truncate(&x, &y, 5.0, 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        let err = truncate(&x, &y, 4.0, 4.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn empty_or_mismatched_input_fails() {
        assert!(truncate(&[], &[], 0.0, 1.0).is_err());
        assert!(truncate(&[0.0, 1.0], &[0.0], 0.0, 1.0).is_err());
    }

    #[test]
    fn select_all_keeps_everything() {
        let (x, y) = ramp(4);
        let w = select_window(&x, &y, &FitRange::All).unwrap();
        assert_eq!(w.len(), 4);
        assert_eq!(w.offset, 0);
        assert_eq!(w.original_index(3), 3);
    }
}
