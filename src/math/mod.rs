//! Mathematical utilities: least squares and Black-Scholes primitives.

pub mod blackscholes;
pub mod ols;

pub use blackscholes::*;
pub use ols::*;
