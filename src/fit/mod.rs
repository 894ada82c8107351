//! Resonance fitting.
//!
//! Responsibilities:
//!
//! - map box-bounded parameters onto an unconstrained solver (`bounds`)
//! - drive Levenberg–Marquardt through a replaceable seam (`solver`)
//! - seed, solve and package a single resonance fit (`resonance`)
//! - fit many datasets in parallel (`batch`)

pub mod batch;
pub mod bounds;
pub mod resonance;
pub mod solver;

pub use batch::*;
pub use resonance::*;
pub use solver::*;
