//! CSV sweep ingest.
//!
//! This module turns a swept-frequency CSV export into a clean `Dataset`:
//! one frequency axis (Hz) plus whichever S-parameter traces the file carries.
//!
//! Accepted columns (case-insensitive, UTF-8 BOM tolerated):
//! - frequency: `freq_hz`, `frequency`, `freq` or `f` (Hz)
//! - per S-parameter `sNM`: either `sNM_re` + `sNM_im` (complex), or `sNM_db`
//!
//! Design goals:
//! - **Strict schema** for the frequency column (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;
use log::{debug, warn};
use nalgebra::Complex;

use crate::domain::{DatasetSpec, FreqUnit, SParam, Scale, Series};
use crate::error::AppError;
use crate::math::{complex_to_scale, db_to_scale, to_unit};

const FREQ_COLUMNS: [&str; 4] = ["freq_hz", "frequency", "freq", "f"];

/// One S-parameter trace as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Complex(Vec<Complex<f64>>),
    Db(Vec<f64>),
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// A named sweep.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub freq_hz: Vec<f64>,
    pub traces: HashMap<SParam, Trace>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Dataset {
    fn trace(&self, sparam: SParam) -> Result<&Trace, AppError> {
        self.traces.get(&sparam).ok_or_else(|| {
            AppError::precondition(format!(
                "Dataset '{}' has no {} columns.",
                self.name,
                sparam.display_name()
            ))
        })
    }

    /// Magnitude response on the requested scale.
    pub fn response(&self, sparam: SParam, scale: Scale) -> Result<Vec<f64>, AppError> {
        Ok(match self.trace(sparam)? {
            Trace::Complex(values) => complex_to_scale(values, scale),
            Trace::Db(values) => db_to_scale(values, scale),
        })
    }

    /// Complex reflection trace; dB-only files cannot provide one.
    pub fn reflection(&self, sparam: SParam) -> Result<&[Complex<f64>], AppError> {
        match self.trace(sparam)? {
            Trace::Complex(values) => Ok(values.as_slice()),
            Trace::Db(_) => Err(AppError::precondition(format!(
                "Dataset '{}' stores {} in dB only; impedance needs {}_re/{}_im columns.",
                self.name,
                sparam.display_name(),
                sparam.column_prefix(),
                sparam.column_prefix()
            ))),
        }
    }

    /// Frequency axis in `unit`.
    pub fn freq(&self, unit: FreqUnit) -> Vec<f64> {
        to_unit(&self.freq_hz, unit)
    }

    /// `(frequency, response)` ready for extremum search or fitting.
    pub fn series(&self, sparam: SParam, scale: Scale, unit: FreqUnit) -> Result<Series, AppError> {
        Series::new(self.freq(unit), self.response(sparam, scale)?)
    }
}

/// Load a dataset from disk.
pub fn load_dataset(spec: &DatasetSpec) -> Result<Dataset, AppError> {
    let file = File::open(&spec.path)
        .map_err(|e| AppError::io(format!("Failed to open sweep CSV '{}': {e}", spec.path.display())))?;
    let dataset = read_dataset(&spec.name, file)?;
    if !dataset.row_errors.is_empty() {
        warn!(
            "{}: skipped {} of {} rows (first: line {}: {})",
            spec.name,
            dataset.row_errors.len(),
            dataset.rows_read,
            dataset.row_errors[0].line,
            dataset.row_errors[0].message
        );
    }
    Ok(dataset)
}

/// Parse a sweep CSV from any reader.
pub fn read_dataset<R: Read>(name: &str, reader: R) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers for '{name}': {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let freq_col = FREQ_COLUMNS
        .iter()
        .find_map(|c| header_map.get(*c).copied())
        .ok_or_else(|| {
            AppError::invalid_argument(format!(
                "'{name}': missing frequency column (one of {}).",
                FREQ_COLUMNS.join(", ")
            ))
        })?;

    let layouts = resolve_layouts(&header_map);
    if layouts.is_empty() {
        return Err(AppError::invalid_argument(format!(
            "'{name}': no S-parameter columns found (expected e.g. s11_re/s11_im or s11_db)."
        )));
    }
    debug!("{name}: columns {:?}", layouts);

    let mut freq_hz = Vec::new();
    let mut complex: HashMap<SParam, Vec<Complex<f64>>> = HashMap::new();
    let mut db: HashMap<SParam, Vec<f64>> = HashMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, freq_col, &layouts) {
            Ok((f, values)) => {
                freq_hz.push(f);
                for (sparam, value) in values {
                    match value {
                        Sample::Complex(c) => complex.entry(sparam).or_default().push(c),
                        Sample::Db(v) => db.entry(sparam).or_default().push(v),
                    }
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if freq_hz.is_empty() {
        return Err(AppError::precondition(format!(
            "'{name}': no valid rows ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }
    if freq_hz.windows(2).any(|w| w[1] < w[0]) {
        return Err(AppError::precondition(format!(
            "'{name}': frequencies must be non-decreasing."
        )));
    }

    let mut traces = HashMap::new();
    for (sparam, values) in complex {
        traces.insert(sparam, Trace::Complex(values));
    }
    for (sparam, values) in db {
        traces.insert(sparam, Trace::Db(values));
    }

    Ok(Dataset {
        name: name.to_string(),
        freq_hz,
        traces,
        row_errors,
        rows_read,
    })
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Complex { re: usize, im: usize },
    Db(usize),
}

enum Sample {
    Complex(Complex<f64>),
    Db(f64),
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Complex columns win over dB when both are present.
fn resolve_layouts(header_map: &HashMap<String, usize>) -> Vec<(SParam, Layout)> {
    SParam::ALL
        .iter()
        .filter_map(|&sparam| {
            let p = sparam.column_prefix();
            let re = header_map.get(&format!("{p}_re"));
            let im = header_map.get(&format!("{p}_im"));
            let db = header_map.get(&format!("{p}_db"));
            match (re, im, db) {
                (Some(&re), Some(&im), _) => Some((sparam, Layout::Complex { re, im })),
                (_, _, Some(&db)) => Some((sparam, Layout::Db(db))),
                _ => None,
            }
        })
        .collect()
}

fn parse_row(
    record: &StringRecord,
    freq_col: usize,
    layouts: &[(SParam, Layout)],
) -> Result<(f64, Vec<(SParam, Sample)>), String> {
    let freq = parse_field(record, freq_col, "frequency")?;
    let mut out = Vec::with_capacity(layouts.len());
    for &(sparam, layout) in layouts {
        let sample = match layout {
            Layout::Complex { re, im } => Sample::Complex(Complex::new(
                parse_field(record, re, "real part")?,
                parse_field(record, im, "imaginary part")?,
            )),
            Layout::Db(col) => Sample::Db(parse_field(record, col, "dB value")?),
        };
        out.push((sparam, sample));
    }
    Ok((freq, out))
}

fn parse_field(record: &StringRecord, idx: usize, what: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .ok_or_else(|| format!("missing {what} (column {})", idx + 1))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid {what} '{raw}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite {what} '{raw}'"))
    }
}
