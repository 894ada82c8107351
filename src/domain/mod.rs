//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`SParam`, `Scale`, `FreqUnit`, `ExtremumKind`, `BaselinePolicy`)
//! - range and series types (`FitRange`, `Series`)
//! - fit outputs (`ResonanceFit`, `ResonanceParams`, `ResonanceFile`, etc.)

pub mod types;

pub use types::*;
