//! Array utilities: range truncation, extremum search, unit conversion, impedance.

pub mod extremum;
pub mod impedance;
pub mod truncate;
pub mod units;

pub use extremum::*;
pub use impedance::*;
pub use truncate::*;
pub use units::*;
