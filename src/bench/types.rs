//! Benchmark result types.
//!
//! Per-trial records use the `httpStatus` / `eventCounts` / `timings.ttft_ms`
//! layout. The run header adds `runId`, `startedAt` and a `completed` flag per
//! trial, and names config fields `scenario` / `trials`; the older `profile` /
//! `runs` keys are accepted when reading a config back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::events::UsageUpdate;
use crate::types::{RunConfig, RunId};

/// Token accounting extracted from one trial's stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
}

impl Usage {
    /// Overwrite each field present in `update`; absent fields keep their value.
    pub fn apply(&mut self, update: &UsageUpdate) {
        if let Some(n) = update.input_tokens {
            self.input_tokens = n;
        }
        if let Some(n) = update.output_tokens {
            self.output_tokens = n;
        }
        if let Some(n) = update.cache_read_input_tokens {
            self.cache_read_input_tokens = n;
        }
        if let Some(n) = update.cache_creation_input_tokens {
            self.cache_creation_input_tokens = n;
        }
    }
}

/// Per-trial latencies, in whole milliseconds since request start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Time to first content fragment (or first event). `None` if no event arrived.
    pub ttft_ms: Option<u64>,
    /// Time until terminal event, end of stream, or abort.
    pub total_ms: Option<u64>,
}

/// Round a duration to the nearest millisecond.
pub fn round_ms(duration: Duration) -> u64 {
    (duration.as_secs_f64() * 1000.0).round() as u64
}

/// Outcome of one trial. Immutable once the trial finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    /// HTTP status, or 0 if no response was received.
    pub http_status: u16,
    /// Status was 2xx.
    pub http_ok: bool,
    /// The terminal event was observed. Does not gate [`TrialResult::is_ok`].
    pub completed: bool,
    pub timings: Timings,
    pub usage: Usage,
    pub event_counts: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl TrialResult {
    /// Counted as successful: 2xx status and no trial error.
    ///
    /// A stream that closed without the terminal event still counts; check
    /// [`TrialResult::completed`] to tell the two apart.
    pub fn is_ok(&self) -> bool {
        self.http_ok && self.error.is_none()
    }
}

/// Complete record of one benchmark invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub config: RunConfig,
    pub warmup_results: Vec<TrialResult>,
    /// `results[i]` is the outcome of measured trial `i`.
    pub results: Vec<TrialResult>,
}
