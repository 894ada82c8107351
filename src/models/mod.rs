//! Resonance curve models.
//!
//! Models are implemented as small, pure functions behind the `CurveModel`
//! trait so that the solver code can stay generic.

pub mod curve;
pub mod lorentzian;

pub use curve::*;
pub use lorentzian::*;
