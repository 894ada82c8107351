//! Command-line parsing for the resonance fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{BaselinePolicy, DatasetSpec, ExtremumKind, FitRange, FreqUnit, SParam, Scale};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rfq", version, about = "RF resonance extremum search and Lorentzian Q fitting")]
pub struct Cli {
    /// Enable debug logging (overrides RFQ_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a Lorentzian resonance to each dataset and report center, Q and impedance.
    Fit(FitArgs),
    /// Locate the minimum or maximum of each dataset's response.
    Extremum(ExtremumArgs),
    /// Write a synthetic resonance sweep CSV.
    Synth(SynthArgs),
}

/// Dataset and trace selection shared by `fit` and `extremum`.
#[derive(Debug, Args, Clone)]
pub struct TraceArgs {
    /// Sweep CSV, as NAME=PATH (name defaults to the file stem). Repeatable.
    #[arg(short = 'd', long = "dataset", required = true)]
    pub datasets: Vec<DatasetSpec>,

    /// Coordinate window: `all`, `lo,hi` or `lo:hi`, in `--unit`.
    ///
    /// Resolved by [`TraceArgs::fit_range`].
    #[arg(short, long, default_value = "all")]
    pub range: String,

    /// S-parameter to analyse.
    #[arg(short, long, value_enum, default_value_t = SParam::S11)]
    pub sparam: SParam,

    /// Frequency unit for the coordinate axis.
    #[arg(short, long, value_enum, default_value_t = FreqUnit::Ghz)]
    pub unit: FreqUnit,

    /// Response scale.
    #[arg(long, value_enum, default_value_t = Scale::Db)]
    pub scale: Scale,
}

impl TraceArgs {
    /// Parse `--range`: malformed text is an invalid argument, `hi <= lo` a precondition error.
    pub fn fit_range(&self) -> Result<FitRange, AppError> {
        self.range.parse()
    }
}

/// Options for `rfq fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub trace: TraceArgs,

    /// Background bound policy.
    #[arg(long, value_enum, default_value_t = BaselinePolicy::DbReflection)]
    pub baseline: BaselinePolicy,

    /// Initial linewidth guess, in `--unit`.
    #[arg(long, default_value_t = 0.1)]
    pub sigma_init: f64,

    /// Lower bound on the linewidth.
    #[arg(long, default_value_t = 0.001)]
    pub sigma_min: f64,

    /// Upper bound on the linewidth.
    #[arg(long, default_value_t = 1.0)]
    pub sigma_max: f64,

    /// Reference impedance in ohms (falls back to RFQ_Z0, then 50).
    #[arg(long)]
    pub z0: Option<f64>,

    /// Export per-dataset results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fitted parameters and curves to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,
}

/// Options for `rfq extremum`.
#[derive(Debug, Args, Clone)]
pub struct ExtremumArgs {
    #[command(flatten)]
    pub trace: TraceArgs,

    /// Which extremum to locate.
    #[arg(short, long, value_enum, default_value_t = ExtremumKind::Min)]
    pub kind: ExtremumKind,
}

/// Options for `rfq synth`.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output CSV path.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Sweep start, in GHz.
    #[arg(long, default_value_t = 7.0)]
    pub start: f64,

    /// Sweep stop, in GHz.
    #[arg(long, default_value_t = 9.0)]
    pub stop: f64,

    /// Number of frequency points.
    #[arg(short = 'n', long, default_value_t = 401)]
    pub points: usize,

    /// Resonance center, in GHz.
    #[arg(long, default_value_t = 8.0)]
    pub center: f64,

    /// Lorentzian half-width, in GHz.
    #[arg(long, default_value_t = 0.05)]
    pub sigma: f64,

    /// Lorentzian area (negative for a dip).
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub amplitude: f64,

    /// Constant background, in dB.
    #[arg(long, default_value_t = -0.5, allow_negative_numbers = true)]
    pub background: f64,

    /// Gaussian noise standard deviation, in dB.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// S-parameter column to write.
    #[arg(short, long, value_enum, default_value_t = SParam::S11)]
    pub sparam: SParam,
}
