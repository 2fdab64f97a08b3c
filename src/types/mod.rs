//! Core types for the benchmark harness.
//!
//! - **IDs**: Run identifiers
//! - **Errors**: Run-level and trial-level error types with thiserror derives
//! - **Config**: The immutable per-run configuration

mod config;
mod errors;
mod ids;

pub use config::{RunConfig, MESSAGES_PATH};
pub use errors::{Error, Result, TrialError};
pub use ids::RunId;
