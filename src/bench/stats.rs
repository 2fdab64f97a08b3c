//! Aggregate statistics over measured trial results.

use serde::{Deserialize, Serialize};

use super::types::TrialResult;

/// p50/p95 pair. Fields are `None` when no samples exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p50: Option<u64>,
    pub p95: Option<u64>,
}

impl Percentiles {
    pub fn from_samples(samples: &[u64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        Self {
            p50: percentile_sorted(&sorted, 50.0),
            p95: percentile_sorted(&sorted, 95.0),
        }
    }
}

/// Derived view of a run's measured results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub ok: usize,
    pub fail: usize,
    pub ttft_ms: Percentiles,
    pub total_ms: Percentiles,
    /// Output tokens per second of summed trial wall time.
    pub tokens_per_sec: Option<f64>,
}

impl Summary {
    pub fn from_results(results: &[TrialResult]) -> Self {
        let ok: Vec<&TrialResult> = results.iter().filter(|r| r.is_ok()).collect();

        let ttft: Vec<u64> = ok.iter().filter_map(|r| r.timings.ttft_ms).collect();
        let total: Vec<u64> = ok.iter().filter_map(|r| r.timings.total_ms).collect();

        let output_tokens: u64 = ok.iter().map(|r| r.usage.output_tokens).sum();
        let total_secs = total.iter().sum::<u64>() as f64 / 1000.0;

        Self {
            ok: ok.len(),
            fail: results.len() - ok.len(),
            ttft_ms: Percentiles::from_samples(&ttft),
            total_ms: Percentiles::from_samples(&total),
            tokens_per_sec: tokens_per_sec(output_tokens, total_secs),
        }
    }
}

/// Nearest-rank percentile without interpolation:
/// element at `floor((p / 100) * (n - 1))` of the ascending samples.
pub fn percentile(samples: &[u64], p: f64) -> Option<u64> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    percentile_sorted(&sorted, p)
}

fn percentile_sorted(sorted: &[u64], p: f64) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted.get(idx.min(sorted.len() - 1)).copied()
}

fn tokens_per_sec(output_tokens: u64, total_secs: f64) -> Option<f64> {
    if total_secs <= 0.0 {
        return None;
    }
    let rate = output_tokens as f64 / total_secs;
    Some((rate * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::types::{Timings, Usage};

    fn ok_trial(ttft: Option<u64>, total: u64, output_tokens: u64) -> TrialResult {
        TrialResult {
            http_status: 200,
            http_ok: true,
            completed: true,
            timings: Timings {
                ttft_ms: ttft,
                total_ms: Some(total),
            },
            usage: Usage {
                output_tokens,
                ..Usage::default()
            },
            ..TrialResult::default()
        }
    }

    #[test]
    fn test_nearest_rank_percentiles() {
        let values = [50, 10, 40, 20, 30];
        assert_eq!(percentile(&values, 50.0), Some(30));
        // floor(0.95 * 4) = 3
        assert_eq!(percentile(&values, 95.0), Some(40));
        assert_eq!(percentile(&values, 100.0), Some(50));
        assert_eq!(percentile(&values, 0.0), Some(10));
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[7], 95.0), Some(7));
    }

    #[test]
    fn test_throughput() {
        let results = [ok_trial(Some(5), 1000, 100), ok_trial(Some(8), 1000, 300)];
        let summary = Summary::from_results(&results);
        assert_eq!(summary.tokens_per_sec, Some(200.0));
        assert_eq!(summary.ok, 2);
        assert_eq!(summary.fail, 0);
    }

    #[test]
    fn test_throughput_rounded_to_two_decimals() {
        let results = [ok_trial(None, 3000, 100)];
        assert_eq!(
            Summary::from_results(&results).tokens_per_sec,
            Some(33.33)
        );
    }

    #[test]
    fn test_failed_trials_excluded() {
        let failed = TrialResult {
            error: Some("Timeout after 100ms".into()),
            ..ok_trial(Some(1), 100_000, 9999)
        };
        let rejected = TrialResult {
            http_status: 500,
            http_ok: false,
            ..ok_trial(Some(1), 100_000, 9999)
        };
        let results = [ok_trial(None, 2000, 50), failed, rejected];
        let summary = Summary::from_results(&results);

        assert_eq!(summary.ok, 1);
        assert_eq!(summary.fail, 2);
        // null ttft excluded rather than counted as zero
        assert_eq!(summary.ttft_ms, Percentiles::default());
        assert_eq!(summary.total_ms.p50, Some(2000));
        assert_eq!(summary.tokens_per_sec, Some(25.0));
    }

    #[test]
    fn test_all_failed_yields_null_statistics() {
        let results = [TrialResult {
            error: Some("connection refused".into()),
            ..TrialResult::default()
        }];
        let summary = Summary::from_results(&results);
        assert_eq!(summary.ok, 0);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.ttft_ms, Percentiles::default());
        assert_eq!(summary.total_ms, Percentiles::default());
        assert_eq!(summary.tokens_per_sec, None);
    }

    #[test]
    fn test_zero_duration_yields_no_throughput() {
        let results = [ok_trial(Some(0), 0, 10)];
        assert_eq!(Summary::from_results(&results).tokens_per_sec, None);
    }
}
