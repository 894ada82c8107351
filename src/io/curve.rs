//! Read/write fit JSON files.
//!
//! Fit JSON is the "portable" representation of a batch of resonance fits:
//! - run metadata (tool, timestamp, trace selection, range)
//! - fitted parameters and Q
//! - the model curve over the fit window for quick re-plotting
//!
//! The schema is defined by `domain::ResonanceFile`. Failed fits are omitted.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{FitConfig, ResonanceFile};
use crate::error::AppError;
use crate::report::DatasetReport;

/// Build the JSON records for every successful fit.
pub fn fit_files(reports: &[DatasetReport], config: &FitConfig) -> Vec<ResonanceFile> {
    let generated = Utc::now();
    reports
        .iter()
        .filter_map(|r| {
            let fit = r.fit.as_ref().ok()?;
            Some(ResonanceFile {
                tool: "rfq".to_string(),
                generated,
                dataset: r.name.clone(),
                sparam: config.sparam,
                scale: config.scale,
                unit: config.unit,
                range: config.range,
                params: fit.params,
                q: fit.q,
                sse: fit.sse,
                curve: fit.curve.clone(),
            })
        })
        .collect()
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, reports: &[DatasetReport], config: &FitConfig) -> Result<(), AppError> {
    let files = fit_files(reports, config);
    if files.is_empty() {
        return Err(AppError::fit_failure("No successful fits to export."));
    }

    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create fit JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &files)
        .map_err(|e| AppError::io(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<Vec<ResonanceFile>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let files: Vec<ResonanceFile> =
        serde_json::from_reader(file).map_err(|e| AppError::invalid_argument(format!("Invalid fit JSON: {e}")))?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CurveSamples, FitOptions, FitRange, FreqUnit, ResonanceFit, ResonanceParams, SParam, Scale,
    };
    use crate::error::ErrorKind;

    fn config() -> FitConfig {
        FitConfig {
            datasets: vec![],
            sparam: SParam::S21,
            scale: Scale::Db,
            unit: FreqUnit::Ghz,
            range: FitRange::Window { lo: 7.5, hi: 9.0 },
            options: FitOptions::default(),
            z0: 50.0,
            export_results: None,
            export_fit: None,
        }
    }

    fn report(name: &str, center: f64) -> DatasetReport {
        DatasetReport {
            name: name.to_string(),
            fit: Ok(ResonanceFit {
                params: ResonanceParams {
                    center,
                    sigma: 0.05,
                    amplitude: -0.4,
                    background: -0.3,
                },
                q: center / 0.05,
                curve: CurveSamples {
                    x: vec![7.9, 8.0, 8.1],
                    y: vec![-1.0, -2.8, -1.0],
                },
                window_offset: 12,
                sse: 0.02,
                evaluations: 40,
            }),
            impedance: None,
        }
    }

    #[test]
    fn write_then_read_keeps_successful_fits() {
        let reports = vec![
            report("A", 8.0),
            DatasetReport {
                name: "B".to_string(),
                fit: Err(AppError::fit_failure("nope")),
                impedance: None,
            },
            report("C", 8.2),
        ];
        let path = std::env::temp_dir().join(format!("rfq_fit_{}.json", std::process::id()));
        write_fit_json(&path, &reports, &config()).unwrap();
        let files = read_fit_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].dataset, "A");
        assert_eq!(files[1].dataset, "C");
        assert_eq!(files[0].sparam, SParam::S21);
        assert_eq!(files[0].range, FitRange::Window { lo: 7.5, hi: 9.0 });
        assert!((files[1].q - 164.0).abs() < 1e-9);
        assert_eq!(files[0].curve.x.len(), 3);
        assert_eq!(files[0].tool, "rfq");
    }

    #[test]
    fn nothing_to_export_is_a_fit_failure() {
        let reports = vec![DatasetReport {
            name: "B".to_string(),
            fit: Err(AppError::fit_failure("nope")),
            impedance: None,
        }];
        let path = std::env::temp_dir().join(format!("rfq_fit_empty_{}.json", std::process::id()));
        let err = write_fit_json(&path, &reports, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FitFailure);
        assert!(!path.exists());
    }

    #[test]
    fn garbage_is_rejected() {
        let path = std::env::temp_dir().join(format!("rfq_fit_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let err = read_fit_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
