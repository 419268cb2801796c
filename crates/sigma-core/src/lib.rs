//! # sigma-core
//!
//! Core types, traits, configuration, and error handling for the Sigma assistant.

pub mod auth;
pub mod config;
pub mod error;
pub mod intent;
pub mod message;
pub mod prompt;
pub mod traits;
