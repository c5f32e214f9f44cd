//! Data preparation: grouping parsed rows and generating the lookup table.

pub mod generate;
pub mod groups;

pub use generate::*;
pub use groups::*;
