//! Trial executor: one request, one streamed response, one [`TrialResult`].
//!
//! Trial phases:
//! ```text
//! Started → Connecting → Streaming (chunk reads) → Completed
//!                                                     ↘ TimedOut
//!                                                     ↘ NetworkError
//! ```
//! Each trial owns a [`CancellationToken`] cancelled by its own deadline
//! timer. Both the connect phase and every chunk read race the token, so an
//! expired deadline aborts only this trial.

use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::scenario::MessagesRequest;
use super::tracker::MilestoneTracker;
use super::types::TrialResult;
use crate::sse::{decode_frame, FrameSplitter};
use crate::types::{Error, Result, RunConfig, TrialError};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_BETA: &str = "interleaved-thinking-2025-05-14";

/// Lifecycle phase of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Started,
    Connecting,
    Streaming,
    Completed,
    TimedOut,
    NetworkError,
}

impl TrialPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialPhase::Started => "started",
            TrialPhase::Connecting => "connecting",
            TrialPhase::Streaming => "streaming",
            TrialPhase::Completed => "completed",
            TrialPhase::TimedOut => "timed_out",
            TrialPhase::NetworkError => "network_error",
        }
    }
}

/// State gathered while a trial runs; survives early returns so partial
/// timings and usage are still reported.
#[derive(Debug, Default)]
struct TrialProgress {
    status: Option<StatusCode>,
    tracker: MilestoneTracker,
}

/// Issues trials against the configured endpoint.
///
/// The request body is serialized once and the same bytes are sent by every
/// trial. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct TrialExecutor {
    client: reqwest::Client,
    endpoint: Url,
    headers: HeaderMap,
    body: Bytes,
    timeout: Duration,
    timeout_ms: u64,
}

impl TrialExecutor {
    pub fn new(config: &RunConfig, payload: &MessagesRequest) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.concurrency)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url()?,
            headers: request_headers(config.api_key.as_deref())?,
            body: Bytes::from(serde_json::to_vec(payload)?),
            timeout: config.timeout,
            timeout_ms: config.timeout_ms(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run one trial. Never fails: every error is captured on the result.
    pub async fn run(&self) -> TrialResult {
        let started = Instant::now();
        enter(TrialPhase::Started);

        let cancel = CancellationToken::new();
        let deadline = tokio::spawn({
            let cancel = cancel.clone();
            let timeout = self.timeout;
            async move {
                tokio::time::sleep(timeout).await;
                cancel.cancel();
            }
        });

        let mut progress = TrialProgress::default();
        let outcome = self.stream(&cancel, started, &mut progress).await;
        deadline.abort();
        let stopped_at = started.elapsed();

        match &outcome {
            Ok(()) if progress.tracker.is_complete() => enter(TrialPhase::Completed),
            Ok(()) => tracing::debug!("stream closed before terminal event"),
            Err(TrialError::Timeout(_)) => enter(TrialPhase::TimedOut),
            Err(e) => {
                enter(TrialPhase::NetworkError);
                tracing::debug!("trial failed: {}", e);
            }
        }

        let TrialProgress { status, tracker } = progress;
        TrialResult {
            http_status: status.map(|s| s.as_u16()).unwrap_or(0),
            http_ok: status.is_some_and(|s| s.is_success()),
            completed: tracker.is_complete(),
            timings: tracker.timings(stopped_at),
            usage: tracker.usage(),
            event_counts: tracker.into_event_counts(),
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    async fn stream(
        &self,
        cancel: &CancellationToken,
        started: Instant,
        progress: &mut TrialProgress,
    ) -> std::result::Result<(), TrialError> {
        enter(TrialPhase::Connecting);
        let request = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .body(self.body.clone());

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TrialError::Timeout(self.timeout_ms)),
            sent = request.send() => sent?,
        };
        progress.status = Some(response.status());
        enter(TrialPhase::Streaming);

        let mut body = response.bytes_stream();
        let mut splitter = FrameSplitter::new();
        let mut received = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TrialError::Timeout(self.timeout_ms)),
                next = body.next() => next,
            };
            let chunk = match next {
                Some(chunk) => chunk?,
                None => break,
            };
            received += chunk.len();
            tracing::trace!(bytes = chunk.len(), "chunk");

            for frame in splitter.push(&chunk) {
                let Some(event) = decode_frame(&frame) else {
                    continue;
                };
                if progress.tracker.observe(&event, started.elapsed()) {
                    return Ok(());
                }
            }
        }

        // EOF before any byte, whether framed by content-length or chunked.
        if received == 0 {
            return Err(TrialError::MissingBody);
        }

        let dropped = splitter.finish();
        if dropped > 0 {
            tracing::debug!("discarded {} bytes of unterminated frame data", dropped);
        }
        Ok(())
    }
}

fn enter(phase: TrialPhase) {
    tracing::debug!(phase = phase.as_str(), "trial phase");
}

fn request_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
    headers.insert("anthropic-beta", HeaderValue::from_static(ANTHROPIC_BETA));
    if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|_| Error::config("api key contains invalid header characters"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
