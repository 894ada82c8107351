//! Fit many named datasets in parallel.
//!
//! Each dataset is independent, so fits run on the rayon pool. The output
//! keeps the input order and carries one `Result` per dataset; deciding what
//! to do with a failed entry is left to the caller.

use rayon::prelude::*;

use crate::domain::{FitOptions, FitRange, ResonanceFit, Series};
use crate::error::AppError;
use crate::fit::resonance::{fit_resonance_with, validate_range};
use crate::fit::solver::{LeastSquaresSolver, LmSolver};

/// A series labelled with its dataset name.
#[derive(Debug, Clone)]
pub struct NamedSeries {
    pub name: String,
    pub series: Series,
}

/// One dataset's fit outcome.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub name: String,
    pub result: Result<ResonanceFit, AppError>,
}

impl BatchEntry {
    pub fn fit(&self) -> Option<&ResonanceFit> {
        self.result.as_ref().ok()
    }
}

pub fn fit_datasets(datasets: &[NamedSeries], range: &FitRange, opts: &FitOptions) -> Result<Vec<BatchEntry>, AppError> {
    fit_datasets_with(&LmSolver::default(), datasets, range, opts)
}

/// Fit every dataset over the same range.
///
/// A malformed range fails the whole batch up front; per-dataset failures
/// (empty window, non-convergence, ...) are reported in their entry.
pub fn fit_datasets_with(
    solver: &dyn LeastSquaresSolver,
    datasets: &[NamedSeries],
    range: &FitRange,
    opts: &FitOptions,
) -> Result<Vec<BatchEntry>, AppError> {
    validate_range(range)?;

    Ok(datasets
        .par_iter()
        .map(|d| BatchEntry {
            name: d.name.clone(),
            result: fit_resonance_with(solver, &d.series.x, &d.series.y, range, opts),
        })
        .collect())
}
