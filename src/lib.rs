//! # Stream Bench - Streaming Latency/Throughput Harness
//!
//! Benchmarks a chat-completion endpoint that answers with server-sent
//! events:
//! - Concurrent trials over a bounded worker pool with exactly-once indexing
//! - Incremental SSE frame splitting and event decoding per trial
//! - Milestone timing (first event, first content fragment, completion)
//! - Token usage extraction from `message_start` / `message_delta`
//! - Nearest-rank p50/p95 latencies and aggregate tokens/sec
//!
//! ## Architecture
//!
//! ```text
//!   RunConfig ─→ BenchRunner ─→ WorkerPool ──┬─→ TrialExecutor ─┐
//!                    │                       ├─→ TrialExecutor ─┤
//!                    │                       └─→ TrialExecutor ─┤
//!                    │      ┌───────────────────────────────────┘
//!                    │      ▼
//!                    │   bytes → FrameSplitter → decode_frame → MilestoneTracker
//!                    ▼                                              │
//!                RunResult ←──────────── TrialResult ←──────────────┘
//!                    │
//!                    ▼
//!                 Summary → report
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod bench;
pub mod events;
pub mod report;
pub mod sse;
pub mod types;

// Internal utilities
pub mod observability;

pub use bench::{BenchRunner, RunResult, Scenario, Summary, TrialResult};
pub use types::{Error, Result, RunConfig};
