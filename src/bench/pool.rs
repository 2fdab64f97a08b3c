//! Bounded worker pool over an exactly-once trial index dispenser.
//!
//! Workers are tokio tasks. The counter is the only state they share; each
//! worker keeps its own `(index, output)` list and the pool assembles the
//! slots after every worker has returned.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::types::{Error, Result};

/// Monotonic dispenser of trial indices in `0..limit`.
#[derive(Debug)]
pub struct TrialCounter {
    next: AtomicUsize,
    limit: usize,
}

impl TrialCounter {
    pub fn new(limit: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            limit,
        }
    }

    /// Claim the next index, or `None` once all indices are handed out.
    pub fn claim(&self) -> Option<usize> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.limit).then_some(index)
    }
}

/// Runs `trials` jobs on at most `concurrency` workers.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    trials: usize,
    concurrency: usize,
}

impl WorkerPool {
    pub fn new(trials: usize, concurrency: usize) -> Self {
        Self {
            trials,
            concurrency,
        }
    }

    /// Number of workers actually spawned.
    pub fn worker_count(&self) -> usize {
        self.concurrency.min(self.trials)
    }

    /// Run `job(index)` once for every index in `0..trials`.
    ///
    /// The returned vector is ordered by index regardless of completion
    /// order. Fails if a worker panics or an index is produced twice or not
    /// at all.
    pub async fn run<T, F, Fut>(&self, job: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let counter = Arc::new(TrialCounter::new(self.trials));
        let job = Arc::new(job);
        let mut workers = JoinSet::new();

        for worker_id in 0..self.worker_count() {
            let counter = counter.clone();
            let job = job.clone();
            workers.spawn(async move {
                let mut produced = Vec::new();
                while let Some(index) = counter.claim() {
                    produced.push((index, (*job)(index).await));
                }
                tracing::debug!("worker {} finished after {} trials", worker_id, produced.len());
                produced
            });
        }

        let mut slots: Vec<Option<T>> = (0..self.trials).map(|_| None).collect();
        while let Some(joined) = workers.join_next().await {
            let produced =
                joined.map_err(|e| Error::internal(format!("benchmark worker failed: {}", e)))?;
            for (index, output) in produced {
                let slot = slots
                    .get_mut(index)
                    .ok_or_else(|| Error::internal(format!("trial index {} out of range", index)))?;
                if slot.replace(output).is_some() {
                    return Err(Error::internal(format!("trial {} recorded twice", index)));
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| Error::internal(format!("trial {} never ran", index)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn test_counter_dispenses_each_index_once() {
        let counter = TrialCounter::new(3);
        assert_eq!(counter.claim(), Some(0));
        assert_eq!(counter.claim(), Some(1));
        assert_eq!(counter.claim(), Some(2));
        assert_eq!(counter.claim(), None);
        assert_eq!(counter.claim(), None);
    }

    #[test]
    fn test_worker_count_capped_by_trials() {
        assert_eq!(WorkerPool::new(3, 16).worker_count(), 3);
        assert_eq!(WorkerPool::new(100, 4).worker_count(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exactly_once_indexing() {
        for concurrency in [1, 4, 16] {
            let calls = Arc::new(Mutex::new(vec![0u32; 100]));
            let recorded = calls.clone();
            let outputs = WorkerPool::new(100, concurrency)
                .run(move |index| {
                    let recorded = recorded.clone();
                    async move {
                        // Vary completion order.
                        tokio::time::sleep(Duration::from_millis((index % 7) as u64)).await;
                        recorded.lock().unwrap()[index] += 1;
                        index * 10
                    }
                })
                .await
                .unwrap();

            assert_eq!(outputs.len(), 100);
            for (index, output) in outputs.iter().enumerate() {
                assert_eq!(*output, index * 10);
            }
            assert!(calls.lock().unwrap().iter().all(|&n| n == 1));
        }
    }

    #[tokio::test]
    async fn test_concurrency_bound_respected() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (active.clone(), peak.clone());

        WorkerPool::new(20, 3)
            .run(move |_| {
                let (active, peak) = (a.clone(), p.clone());
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
