//! # sigma-providers
//!
//! AI provider implementations for Sigma.

pub mod gemini;
pub mod retry;
