//! Per-group polynomial fitting.
//!
//! - `fitter`: low-level OLS fit of a single `(time, value)` series
//! - `groups`: fan-out over all groups with skip reasons

pub mod fitter;
pub mod groups;

pub use fitter::*;
pub use groups::*;
