//! Extremum search over a (possibly truncated) series.
//!
//! The reported index always refers to the untruncated series. It is derived
//! from the truncation offset plus the local index, never by searching for the
//! coordinate value again, so duplicate coordinates cannot alias.

use crate::domain::{ExtremumKind, ExtremumResult, FitRange};
use crate::error::AppError;
use crate::math::truncate::select_window;

/// Local index of the min/max of `values`. First occurrence wins on ties.
///
/// NaN values are skipped; returns `None` if nothing comparable remains.
pub fn arg_extremum(values: &[f64], kind: ExtremumKind) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, b)) => match kind {
                ExtremumKind::Min => v < b,
                ExtremumKind::Max => v > b,
            },
        };
        if better {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Find where the requested extremum of `y` occurs within `range`.
pub fn find_extremum(
    x: &[f64],
    y: &[f64],
    kind: ExtremumKind,
    range: &FitRange,
) -> Result<ExtremumResult, AppError> {
    let window = select_window(x, y, range)?;
    if window.is_empty() {
        return Err(AppError::precondition(format!(
            "Range {range} selects no samples; widen it beyond the sample spacing."
        )));
    }

    let local = arg_extremum(window.y, kind).ok_or_else(|| {
        AppError::precondition(format!("Range {range} contains only NaN response values."))
    })?;

    Ok(ExtremumResult {
        coordinate: window.x[local],
        value: window.y[local],
        index: window.original_index(local),
    })
}
