//! # sigma-quant
//!
//! Position-sizing math for Sigma. Everything here is pure and uses exact
//! decimal arithmetic so that money is never rounded through binary floats.

pub mod risk;

pub use risk::{RiskAdvice, RiskCalculator, RiskError};
