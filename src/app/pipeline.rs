//! Shared run logic behind the `fit` and `extremum` subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> series extraction -> extremum search / batch fit -> impedance at center
//!
//! The CLI front-end then only has to print and export.

use log::{debug, warn};

use crate::domain::{DatasetSpec, ExtremumKind, ExtremumResult, FitConfig, FitRange, FreqUnit, SParam, Scale};
use crate::error::AppError;
use crate::fit::{NamedSeries, fit_datasets};
use crate::io::ingest::{Dataset, load_dataset};
use crate::math::{find_extremum, impedance_at};
use crate::report::DatasetReport;

/// Load every dataset, failing on the first unreadable file.
pub fn load_all(specs: &[DatasetSpec]) -> Result<Vec<Dataset>, AppError> {
    specs.iter().map(load_dataset).collect()
}

/// Fit every configured dataset and attach impedance at the fitted center.
pub fn run_fit(config: &FitConfig) -> Result<Vec<DatasetReport>, AppError> {
    let datasets = load_all(&config.datasets)?;
    fit_loaded(&datasets, config)
}

/// Fit already-loaded datasets.
pub fn fit_loaded(datasets: &[Dataset], config: &FitConfig) -> Result<Vec<DatasetReport>, AppError> {
    let named = datasets
        .iter()
        .map(|d| {
            Ok(NamedSeries {
                name: d.name.clone(),
                series: d.series(config.sparam, config.scale, config.unit)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let entries = fit_datasets(&named, &config.range, &config.options)?;

    let reports = entries
        .into_iter()
        .zip(datasets)
        .map(|(entry, dataset)| {
            let impedance = match &entry.result {
                Ok(fit) => center_impedance(dataset, fit.params.center, config),
                Err(err) => {
                    warn!("{}: fit failed: {err}", entry.name);
                    None
                }
            };
            DatasetReport {
                name: entry.name,
                fit: entry.result,
                impedance,
            }
        })
        .collect();

    Ok(reports)
}

/// Impedance is only meaningful for reflection parameters with a complex trace.
fn center_impedance(dataset: &Dataset, center: f64, config: &FitConfig) -> Option<nalgebra::Complex<f64>> {
    if !matches!(config.sparam, SParam::S11 | SParam::S22) {
        return None;
    }
    let gamma = match dataset.reflection(config.sparam) {
        Ok(g) => g,
        Err(err) => {
            debug!("{}: no impedance: {err}", dataset.name);
            return None;
        }
    };
    let freq = dataset.freq(config.unit);
    match impedance_at(&freq, gamma, center, config.z0) {
        Ok(z) => Some(z),
        Err(err) => {
            warn!("{}: impedance lookup failed: {err}", dataset.name);
            None
        }
    }
}

/// Locate the requested extremum in every dataset.
///
/// Per-dataset problems (missing trace, empty window) are reported in place.
pub fn run_extremum(
    specs: &[DatasetSpec],
    sparam: SParam,
    scale: Scale,
    unit: FreqUnit,
    kind: ExtremumKind,
    range: &FitRange,
) -> Result<Vec<(String, Result<ExtremumResult, AppError>)>, AppError> {
    let datasets = load_all(specs)?;
    Ok(datasets
        .iter()
        .map(|d| {
            let result = d
                .series(sparam, scale, unit)
                .and_then(|s| find_extremum(&s.x, &s.y, kind, range));
            (d.name.clone(), result)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SweepSpec, generate_sweep};
    use crate::domain::FitOptions;
    use crate::io::ingest::read_dataset;
    use crate::math::db_to_mag;

    fn config(sparam: SParam) -> FitConfig {
        FitConfig {
            datasets: vec![],
            sparam,
            scale: Scale::Db,
            unit: FreqUnit::Ghz,
            range: FitRange::All,
            options: FitOptions::default(),
            z0: 50.0,
            export_results: None,
            export_fit: None,
        }
    }

    /// Complex CSV whose magnitude follows a noiseless synthetic dip.
    fn complex_sweep() -> Dataset {
        let spec = SweepSpec {
            start: 7.0,
            stop: 9.0,
            points: 401,
            center: 8.0,
            sigma: 0.05,
            amplitude: -1.0,
            background: -0.5,
            noise: 0.0,
        };
        let s = generate_sweep(&spec, 1).unwrap();
        let mut csv = String::from("freq_hz,s11_re,s11_im,s21_db\n");
        for (x, y) in s.x.iter().zip(&s.y) {
            csv.push_str(&format!("{},{},0,{}\n", x * 1e9, db_to_mag(*y), y));
        }
        read_dataset("dut", csv.as_bytes()).unwrap()
    }

    #[test]
    fn fit_reports_center_q_and_impedance() {
        let reports = fit_loaded(&[complex_sweep()], &config(SParam::S11)).unwrap();
        assert_eq!(reports.len(), 1);
        let fit = reports[0].fit.as_ref().unwrap();
        assert!((fit.params.center - 8.0).abs() < 1e-3);
        assert!((fit.q - 160.0).abs() / 160.0 < 0.02);

        // Real, sub-unity reflection: resistive impedance below z0.
        let z = reports[0].impedance.unwrap();
        assert!(z.re > 0.0 && z.re < 50.0);
        assert!(z.im.abs() < 1e-9);
    }

    #[test]
    fn transmission_has_no_impedance() {
        let reports = fit_loaded(&[complex_sweep()], &config(SParam::S21)).unwrap();
        assert!(reports[0].fit.is_ok());
        assert!(reports[0].impedance.is_none());
    }

    #[test]
    fn missing_trace_fails_the_run() {
        assert!(fit_loaded(&[complex_sweep()], &config(SParam::S22)).is_err());
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let specs = vec![DatasetSpec {
            name: "missing".to_string(),
            path: std::env::temp_dir().join("rfq_definitely_missing.csv"),
        }];
        let err = run_extremum(&specs, SParam::S11, Scale::Db, FreqUnit::Ghz, ExtremumKind::Min, &FitRange::All)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
