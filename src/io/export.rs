//! CSV exports: per-dataset fit results and synthetic sweeps.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FitConfig, Series};
use crate::error::AppError;
use crate::report::DatasetReport;

const RESULT_HEADER: [&str; 13] = [
    "dataset",
    "sparam",
    "scale",
    "unit",
    "center",
    "sigma",
    "amplitude",
    "background",
    "q",
    "sse",
    "z_re_ohm",
    "z_im_ohm",
    "status",
];

/// Write one row per dataset. Failed fits keep their row with the error message.
pub fn write_results_csv(path: &Path, reports: &[DatasetReport], config: &FitConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, reports, config)
}

fn write_results<W: Write>(out: W, reports: &[DatasetReport], config: &FitConfig) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(RESULT_HEADER)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for r in reports {
        let mut row = vec![
            r.name.clone(),
            config.sparam.column_prefix().to_string(),
            config.scale.label().to_string(),
            config.unit.label().to_string(),
        ];
        match &r.fit {
            Ok(fit) => {
                row.extend([
                    format!("{:.10}", fit.params.center),
                    format!("{:.10}", fit.params.sigma),
                    format!("{:.10}", fit.params.amplitude),
                    format!("{:.10}", fit.params.background),
                    format!("{:.6}", fit.q),
                    format!("{:.6e}", fit.sse),
                    r.impedance.map(|z| format!("{:.6}", z.re)).unwrap_or_default(),
                    r.impedance.map(|z| format!("{:.6}", z.im)).unwrap_or_default(),
                    "ok".to_string(),
                ]);
            }
            Err(err) => {
                row.extend(std::iter::repeat_n(String::new(), 8));
                row.push(format!("error: {err}"));
            }
        }
        writer
            .write_record(&row)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))
}

/// Write a synthetic dB sweep in the ingest format (`freq_hz`, `<sparam>_db`).
///
/// `series.x` is in `unit_divisor` units and is scaled back to Hz.
pub fn write_sweep_csv(path: &Path, series: &Series, column: &str, unit_divisor: f64) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create sweep CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["freq_hz".to_string(), format!("{column}_db")])
        .map_err(|e| AppError::io(format!("Failed to write sweep CSV: {e}")))?;
    for (x, y) in series.x.iter().zip(series.y.iter()) {
        writer
            .write_record([format!("{:.6}", x * unit_divisor), format!("{y:.8}")])
            .map_err(|e| AppError::io(format!("Failed to write sweep CSV: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush sweep CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CurveSamples, FitOptions, FitRange, FreqUnit, ResonanceFit, ResonanceParams, SParam, Scale,
    };
    use crate::io::ingest::read_dataset;
    use nalgebra::Complex;

    fn config() -> FitConfig {
        FitConfig {
            datasets: vec![],
            sparam: SParam::S11,
            scale: Scale::Db,
            unit: FreqUnit::Ghz,
            range: FitRange::All,
            options: FitOptions::default(),
            z0: 50.0,
            export_results: None,
            export_fit: None,
        }
    }

    #[test]
    fn results_include_failures() {
        let ok = DatasetReport {
            name: "a".to_string(),
            fit: Ok(ResonanceFit {
                params: ResonanceParams {
                    center: 8.0,
                    sigma: 0.1,
                    amplitude: -1.0,
                    background: -0.2,
                },
                q: 80.0,
                curve: CurveSamples { x: vec![], y: vec![] },
                window_offset: 0,
                sse: 1e-3,
                evaluations: 10,
            }),
            impedance: Some(Complex::new(49.0, -2.0)),
        };
        let bad = DatasetReport {
            name: "b,2".to_string(),
            fit: Err(AppError::fit_failure("did not converge")),
            impedance: None,
        };

        let mut buf = Vec::new();
        write_results(&mut buf, &[ok, bad], &config()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("a,s11,dB,GHz,8.0000000000,"));
        assert!(lines[1].ends_with("49.000000,-2.000000,ok"));
        assert!(lines[2].starts_with("\"b,2\","));
        assert!(lines[2].ends_with(",,,,,,,,error: did not converge"));
    }

    #[test]
    fn awkward_names_survive_a_csv_reader() {
        let bad = DatasetReport {
            name: "say \"hi\", twice".to_string(),
            fit: Err(AppError::fit_failure("line one,\nline two")),
            impedance: None,
        };
        let mut buf = Vec::new();
        write_results(&mut buf, &[bad], &config()).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), RESULT_HEADER.len());
        assert_eq!(&records[0][0], "say \"hi\", twice");
        assert_eq!(&records[0][12], "error: line one,\nline two");
    }

    #[test]
    fn sweep_round_trips_through_ingest() {
        let series = Series::new(vec![7.0, 7.5, 8.0], vec![-0.5, -9.25, -0.75]).unwrap();
        let path = std::env::temp_dir().join(format!("rfq_sweep_{}.csv", std::process::id()));
        write_sweep_csv(&path, &series, "s11", 1e9).unwrap();

        let file = File::open(&path).unwrap();
        let d = read_dataset("synthetic", file).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(d.freq(FreqUnit::Ghz), series.x);
        assert_eq!(d.response(SParam::S11, Scale::Db).unwrap(), series.y);
    }
}
