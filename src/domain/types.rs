//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during extremum search and fitting
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Frequency display unit.
///
/// Raw sweeps are always stored in Hz; the unit only affects the coordinate
/// axis handed to the fitter (and therefore the units of `center` / `sigma`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FreqUnit {
    Hz,
    Khz,
    Mhz,
    Ghz,
}

impl FreqUnit {
    /// Divisor applied to a value in Hz.
    pub fn divisor(self) -> f64 {
        match self {
            FreqUnit::Hz => 1.0,
            FreqUnit::Khz => 1e3,
            FreqUnit::Mhz => 1e6,
            FreqUnit::Ghz => 1e9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FreqUnit::Hz => "Hz",
            FreqUnit::Khz => "kHz",
            FreqUnit::Mhz => "MHz",
            FreqUnit::Ghz => "GHz",
        }
    }
}

impl FromStr for FreqUnit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hz" => Ok(FreqUnit::Hz),
            "khz" => Ok(FreqUnit::Khz),
            "mhz" => Ok(FreqUnit::Mhz),
            "ghz" => Ok(FreqUnit::Ghz),
            other => Err(AppError::invalid_argument(format!(
                "Invalid frequency unit '{other}'. Try Hz, kHz, MHz, or GHz."
            ))),
        }
    }
}

/// Response scale for S-parameter magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// `20·log10|S|`.
    Db,
    /// `|S|`.
    Linear,
}

impl Scale {
    pub fn label(self) -> &'static str {
        match self {
            Scale::Db => "dB",
            Scale::Linear => "linear",
        }
    }
}

impl FromStr for Scale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "db" => Ok(Scale::Db),
            "linear" | "lin" => Ok(Scale::Linear),
            other => Err(AppError::invalid_argument(format!(
                "Invalid scale '{other}'. Try dB or linear."
            ))),
        }
    }
}

/// Which element of a two-port S-matrix to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SParam {
    #[value(name = "11", alias = "s11")]
    S11,
    #[value(name = "12", alias = "s12")]
    S12,
    #[value(name = "21", alias = "s21")]
    S21,
    #[value(name = "22", alias = "s22")]
    S22,
}

impl SParam {
    pub const ALL: [SParam; 4] = [SParam::S11, SParam::S12, SParam::S21, SParam::S22];

    /// Lowercase column prefix used in sweep CSVs (`s11_re`, `s11_db`, ...).
    pub fn column_prefix(self) -> &'static str {
        match self {
            SParam::S11 => "s11",
            SParam::S12 => "s12",
            SParam::S21 => "s21",
            SParam::S22 => "s22",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SParam::S11 => "S11",
            SParam::S12 => "S12",
            SParam::S21 => "S21",
            SParam::S22 => "S22",
        }
    }
}

impl FromStr for SParam {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let key = key.strip_prefix('s').unwrap_or(&key);
        match key {
            "11" => Ok(SParam::S11),
            "12" => Ok(SParam::S12),
            "21" => Ok(SParam::S21),
            "22" => Ok(SParam::S22),
            _ => Err(AppError::invalid_argument(format!(
                "Invalid S-parameter '{s}'. Try 11, 12, 21, 22."
            ))),
        }
    }
}

/// Which extremum to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Min,
    Max,
}

impl FromStr for ExtremumKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(ExtremumKind::Min),
            "max" => Ok(ExtremumKind::Max),
            other => Err(AppError::invalid_argument(format!(
                "Invalid extremum '{other}'. Only 'min' and 'max' are supported."
            ))),
        }
    }
}

/// Coordinate window used for truncation, extremum search and fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitRange {
    /// Use the entire series.
    All,
    /// Closed interval `[lo, hi]` in coordinate units.
    Window { lo: f64, hi: f64 },
}

impl FitRange {
    /// Build a validated window. `hi <= lo` is a precondition violation.
    pub fn window(lo: f64, hi: f64) -> Result<Self, AppError> {
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(AppError::invalid_argument(format!(
                "Range bounds must be finite (got [{lo}, {hi}])."
            )));
        }
        if hi <= lo {
            return Err(AppError::precondition(format!(
                "Range upper bound must exceed lower bound (got [{lo}, {hi}])."
            )));
        }
        Ok(FitRange::Window { lo, hi })
    }

    /// Build a range from a raw bound list; anything but two elements is malformed.
    pub fn from_bounds(bounds: &[f64]) -> Result<Self, AppError> {
        match bounds {
            [lo, hi] => FitRange::window(*lo, *hi),
            _ => Err(AppError::invalid_argument(format!(
                "The range is not valid. Expected [lo, hi], got {} value(s).",
                bounds.len()
            ))),
        }
    }
}

impl std::fmt::Display for FitRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitRange::All => write!(f, "all"),
            FitRange::Window { lo, hi } => write!(f, "[{lo}, {hi}]"),
        }
    }
}

impl FromStr for FitRange {
    type Err = AppError;

    /// Accepts `all` or `lo,hi` (also `lo:hi`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(FitRange::All);
        }

        let bounds = s
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split([',', ':'])
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    AppError::invalid_argument(format!(
                        "The range is not valid: '{s}'. The only string allowed is 'all', otherwise 'lo,hi'."
                    ))
                })
            })
            .collect::<Result<Vec<f64>, AppError>>()?;

        FitRange::from_bounds(&bounds)
    }
}

/// An ordered `(coordinate, response)` pair of equal-length arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    /// Validate and wrap raw arrays.
    ///
    /// Requires equal, non-zero lengths and a non-decreasing coordinate axis.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, AppError> {
        check_series(&x, &y)?;
        if x.windows(2).any(|w| !(w[1] >= w[0])) {
            return Err(AppError::precondition(
                "Series coordinates must be non-decreasing.",
            ));
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Shared length checks for `(x, y)` slice pairs.
pub fn check_series(x: &[f64], y: &[f64]) -> Result<(), AppError> {
    if x.is_empty() {
        return Err(AppError::precondition("Input series is empty."));
    }
    if x.len() != y.len() {
        return Err(AppError::precondition(format!(
            "Coordinate and response lengths differ ({} vs {}).",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

/// Location of a minimum or maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremumResult {
    pub coordinate: f64,
    pub value: f64,
    /// Index into the untruncated series.
    pub index: usize,
}

/// A solver parameter with its seed and box bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameter {
    pub name: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl ModelParameter {
    /// Bounded parameter. The seed is clamped into `[min, max]`.
    pub fn bounded(name: &'static str, value: f64, min: f64, max: f64) -> Result<Self, AppError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(AppError::precondition(format!(
                "Parameter '{name}' has empty bounds [{min}, {max}]."
            )));
        }
        if !value.is_finite() {
            return Err(AppError::precondition(format!(
                "Parameter '{name}' has a non-finite seed ({value})."
            )));
        }
        Ok(Self {
            name,
            value: value.clamp(min, max),
            min,
            max,
        })
    }

    pub fn unbounded(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

/// How the constant background is bounded during a resonance fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BaselinePolicy {
    /// dB reflection data: background in `[min(y)/2, 0]`.
    #[value(name = "db")]
    DbReflection,
    /// No bounds on the background.
    Free,
}

/// Tunable seeds/bounds for the resonance model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Linewidth seed, in coordinate units.
    pub sigma_init: f64,
    pub sigma_min: f64,
    pub sigma_max: f64,
    pub baseline: BaselinePolicy,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            sigma_init: 0.1,
            sigma_min: 0.001,
            sigma_max: 1.0,
            baseline: BaselinePolicy::DbReflection,
        }
    }
}

/// Best-fit parameters of the Lorentzian-on-constant model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceParams {
    pub center: f64,
    pub sigma: f64,
    pub amplitude: f64,
    pub background: f64,
}

/// Model curve evaluated on the fit window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSamples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Output of a single resonance fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceFit {
    pub params: ResonanceParams,
    /// `center / sigma`.
    pub q: f64,
    pub curve: CurveSamples,
    /// Index of the first window sample in the untruncated series.
    pub window_offset: usize,
    pub sse: f64,
    pub evaluations: usize,
}

/// A named input file, `NAME=PATH` on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for DatasetSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::invalid_argument("Empty dataset argument."));
        }
        if let Some((name, path)) = s.split_once('=') {
            let (name, path) = (name.trim(), path.trim());
            if name.is_empty() || path.is_empty() {
                return Err(AppError::invalid_argument(format!(
                    "Invalid dataset '{s}'. Expected NAME=PATH."
                )));
            }
            return Ok(Self {
                name: name.to_string(),
                path: PathBuf::from(path),
            });
        }

        let path = PathBuf::from(s);
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(s)
            .to_string();
        Ok(Self { name, path })
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub datasets: Vec<DatasetSpec>,
    pub sparam: SParam,
    pub scale: Scale,
    pub unit: FreqUnit,
    pub range: FitRange,
    pub options: FitOptions,
    /// Reference impedance (ohms) used to denormalize `z`.
    pub z0: f64,
    pub export_results: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResonanceFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub dataset: String,
    pub sparam: SParam,
    pub scale: Scale,
    pub unit: FreqUnit,
    pub range: FitRange,
    pub params: ResonanceParams,
    pub q: f64,
    pub sse: f64,
    pub curve: CurveSamples,
}
