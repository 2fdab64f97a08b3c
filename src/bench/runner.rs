//! Run driver: sequential warmup, then the concurrent measured phase.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::pool::WorkerPool;
use super::scenario::{build_payload, MessagesRequest};
use super::trial::TrialExecutor;
use super::types::{RunResult, TrialResult};
use crate::report::progress_line;
use crate::types::{Result, RunConfig, RunId};

/// Pause between sequential warmup trials.
pub const WARMUP_PACING: Duration = Duration::from_millis(100);

/// Validated, ready-to-run benchmark.
///
/// Construction performs every configuration check, so a runner that exists
/// will not fail for configuration reasons once trials start.
#[derive(Debug)]
pub struct BenchRunner {
    config: RunConfig,
    payload: MessagesRequest,
    executor: Arc<TrialExecutor>,
}

impl BenchRunner {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let payload = build_payload(
            config.scenario,
            &config.model,
            config.temperature,
            config.max_tokens,
        );
        let executor = Arc::new(TrialExecutor::new(&config, &payload)?);
        Ok(Self {
            config,
            payload,
            executor,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The request body every trial sends.
    pub fn payload(&self) -> &MessagesRequest {
        &self.payload
    }

    /// Execute warmup and measured trials.
    ///
    /// Trial failures are recorded on their results; only a broken pool
    /// invariant returns an error here.
    pub async fn run(&self) -> Result<RunResult> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        tracing::info!(
            "Run {} starting: {} scenario={} model={} trials={} warmup={} concurrency={}",
            run_id,
            self.executor.endpoint(),
            self.config.scenario,
            self.config.model,
            self.config.trials,
            self.config.warmup,
            self.config.concurrency,
        );

        let warmup_results = self.run_warmup().await;
        let results = self.run_measured().await?;

        Ok(RunResult {
            run_id,
            started_at,
            config: self.config.clone(),
            warmup_results,
            results,
        })
    }

    async fn run_warmup(&self) -> Vec<TrialResult> {
        let count = self.config.warmup;
        let mut results = Vec::with_capacity(count);
        for index in 0..count {
            if index > 0 {
                tokio::time::sleep(WARMUP_PACING).await;
            }
            let result = self.executor.run().await;
            tracing::info!("{}", progress_line(Some("warmup"), index, count, &result));
            results.push(result);
        }
        results
    }

    async fn run_measured(&self) -> Result<Vec<TrialResult>> {
        let trials = self.config.trials;
        let pool = WorkerPool::new(trials, self.config.concurrency);
        tracing::debug!("spawning {} workers", pool.worker_count());

        let executor = self.executor.clone();
        pool.run(move |index| {
            let executor = executor.clone();
            async move {
                let result = executor.run().await;
                tracing::info!("{}", progress_line(None, index, trials, &result));
                result
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::Scenario;
    use crate::types::Error;

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let config = RunConfig {
            concurrency: 0,
            ..RunConfig::default()
        };
        assert!(matches!(BenchRunner::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_payload_built_from_config() {
        let runner = BenchRunner::new(RunConfig {
            scenario: Scenario::Tool,
            model: "m-1".into(),
            max_tokens: 64,
            ..RunConfig::default()
        })
        .unwrap();
        assert_eq!(runner.payload().model, "m-1");
        assert_eq!(runner.payload().thinking.budget_tokens, 64);
        assert!(runner.payload().tools.is_some());
    }
}
