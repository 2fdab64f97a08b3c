//! Configuration structures.
//!
//! A [`RunConfig`] is built once per invocation (from CLI flags or directly
//! by library callers), validated before any network activity, and never
//! mutated afterwards.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::{Error, Result};
use crate::bench::scenario::Scenario;

/// Path of the messages endpoint, resolved against the base URL.
pub const MESSAGES_PATH: &str = "/v1/messages";

/// Immutable configuration for one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Target base address, e.g. `http://127.0.0.1:8045`.
    pub base_url: String,

    /// Bearer credential. Never written to result files.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Model identifier sent in every request.
    pub model: String,

    /// Request payload variant.
    #[serde(alias = "profile")]
    pub scenario: Scenario,

    /// Measured trials (>= 1).
    #[serde(alias = "runs")]
    pub trials: usize,

    /// Sequential warmup trials excluded from statistics.
    pub warmup: usize,

    /// Concurrent workers in the measured phase (>= 1).
    pub concurrency: usize,

    /// Per-trial deadline.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Sampling temperature (>= 0).
    pub temperature: f64,

    /// Output token budget (>= 1). Also used as the reasoning budget.
    pub max_tokens: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8045".to_string(),
            api_key: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
            scenario: Scenario::Text,
            trials: 50,
            warmup: 5,
            concurrency: 1,
            timeout: Duration::from_secs(180),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }
}

impl RunConfig {
    /// Check every field range. Called by the runner before any trial.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::config("trials must be a positive number"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("concurrency must be a positive number"));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(Error::config("temperature must be a non-negative number"));
        }
        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be a positive number"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        if self.model.trim().is_empty() {
            return Err(Error::config("model cannot be empty"));
        }
        self.endpoint_url()?;
        Ok(())
    }

    /// Absolute URL of the messages endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid base url {:?}: {}", self.base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "unsupported url scheme: {}",
                base.scheme()
            )));
        }
        base.join(MESSAGES_PATH)
            .map_err(|e| Error::config(format!("invalid endpoint url: {}", e)))
    }

    /// Per-trial deadline in whole milliseconds (used in timeout messages).
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
