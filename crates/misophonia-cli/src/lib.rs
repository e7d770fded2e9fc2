//! Misophonia CLI library.
//!
//! Command implementations and process setup for the `misophonia` binary.

pub mod commands;
pub mod defaults;
pub mod logging;
