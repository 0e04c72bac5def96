//! # Wiring Support
//!
//! Shared utilities for the wiring crates:
//! - Text rendering for error messages
//! - `tracing-subscriber` setup

pub mod logging;
pub mod rendering;
