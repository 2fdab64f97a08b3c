//! Benchmark harness - trials, worker pool, and aggregation.
//!
//! A run is driven by [`BenchRunner`]: it builds the scenario payload once,
//! runs warmup trials sequentially, then fans the measured trials out over a
//! [`WorkerPool`]. Each trial is executed by [`TrialExecutor`], which feeds
//! the response stream through the SSE codec into a [`MilestoneTracker`].

pub mod pool;
pub mod runner;
pub mod scenario;
pub mod stats;
pub mod tracker;
pub mod trial;
pub mod types;

pub use pool::{TrialCounter, WorkerPool};
pub use runner::BenchRunner;
pub use scenario::{build_payload, MessagesRequest, Scenario};
pub use stats::{percentile, Percentiles, Summary};
pub use tracker::MilestoneTracker;
pub use trial::TrialExecutor;
pub use types::{RunResult, Timings, TrialResult, Usage};
