//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs extremum searches or resonance fits
//! - prints reports
//! - writes optional exports

use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::cli::{Cli, Command, ExtremumArgs, FitArgs, SynthArgs};
use crate::data::{SweepSpec, generate_sweep};
use crate::domain::{BaselinePolicy, FitConfig, FitOptions, FreqUnit, Scale};
use crate::error::AppError;

pub mod pipeline;

/// Default reference impedance in ohms.
pub const DEFAULT_Z0: f64 = 50.0;

/// Entry point for the `rfq` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Extremum(args) => handle_extremum(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::new().filter_or("RFQ_LOG", "warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    // A second init (tests, embedding) is harmless.
    let _ = builder.try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    if config.scale == Scale::Linear && config.options.baseline == BaselinePolicy::DbReflection {
        warn!("linear scale with the dB baseline policy bounds the background to <= 0; consider --baseline free");
    }

    let reports = pipeline::run_fit(&config)?;
    println!("{}", crate::report::format_fit_summary(&reports, &config));

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &reports, &config)?;
        info!("wrote results to {}", path.display());
    }
    if let Some(path) = &config.export_fit {
        crate::io::curve::write_fit_json(path, &reports, &config)?;
        info!("wrote fits to {}", path.display());
    }

    // Every dataset failing is a run failure; partial success is not.
    if let Some(err) = first_error_if_all_failed(&reports) {
        return Err(err);
    }
    Ok(())
}

fn first_error_if_all_failed(reports: &[crate::report::DatasetReport]) -> Option<AppError> {
    if reports.iter().any(|r| r.fit.is_ok()) {
        return None;
    }
    reports.iter().find_map(|r| r.fit.as_ref().err().cloned())
}

fn handle_extremum(args: ExtremumArgs) -> Result<(), AppError> {
    let t = &args.trace;
    let range = t.fit_range()?;
    let results = pipeline::run_extremum(&t.datasets, t.sparam, t.scale, t.unit, args.kind, &range)?;
    println!("{}", crate::report::format_extrema(&results, args.kind, t.unit));

    if results.iter().all(|(_, r)| r.is_err()) {
        if let Some((_, Err(err))) = results.into_iter().next() {
            return Err(err);
        }
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let spec = SweepSpec {
        start: args.start,
        stop: args.stop,
        points: args.points,
        center: args.center,
        sigma: args.sigma,
        amplitude: args.amplitude,
        background: args.background,
        noise: args.noise,
    };
    let series = generate_sweep(&spec, args.seed)?;
    crate::io::export::write_sweep_csv(&args.out, &series, args.sparam.column_prefix(), FreqUnit::Ghz.divisor())?;
    println!(
        "Wrote {} points ({} GHz center, Q={:.0}) to {}",
        series.len(),
        spec.center,
        spec.center / spec.sigma,
        args.out.display()
    );
    Ok(())
}

/// Resolve CLI flags (plus `RFQ_Z0`) into a pipeline configuration.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let z0 = match args.z0 {
        Some(z0) => z0,
        None => z0_from_env()?,
    };
    if !(z0.is_finite() && z0 > 0.0) {
        return Err(AppError::invalid_argument(format!("Reference impedance must be > 0 (got {z0}).")));
    }

    Ok(FitConfig {
        datasets: args.trace.datasets.clone(),
        sparam: args.trace.sparam,
        scale: args.trace.scale,
        unit: args.trace.unit,
        range: args.trace.fit_range()?,
        options: FitOptions {
            sigma_init: args.sigma_init,
            sigma_min: args.sigma_min,
            sigma_max: args.sigma_max,
            baseline: args.baseline,
        },
        z0,
        export_results: args.export.clone(),
        export_fit: args.export_fit.clone(),
    })
}

fn z0_from_env() -> Result<f64, AppError> {
    match std::env::var("RFQ_Z0") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_argument(format!("RFQ_Z0 is not a number: '{raw}'."))),
        Err(_) => Ok(DEFAULT_Z0),
    }
}
