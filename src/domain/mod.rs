//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration enums (`ValueColumn`, `GroupKey`, `Degree`)
//! - raw CSV rows and grouped series (`SampleRow`, `GroupSeries`)
//! - fit outputs (`PolyModel`, `GroupFit`, etc.)

pub mod types;

pub use types::*;
