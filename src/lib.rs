//! `rf-resonance` library crate.
//!
//! The binary (`rfq`) is a thin wrapper around this library so that:
//!
//! - core logic (truncation, extremum search, Lorentzian fitting) is testable without spawning processes
//! - modules are reusable from other tools or notebooks
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
