//! # sigma-channels
//!
//! Messaging platform integrations for Sigma.

pub mod telegram;
pub mod utils;
