//! Milestone and usage tracking for one trial's event sequence.
//!
//! NOT shared - owned by the trial's read loop and fed via &mut self.

use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{round_ms, Timings, Usage};
use crate::events::StreamEvent;
use crate::sse::DecodedEvent;

/// Accumulates milestones, usage, and event tallies as events arrive.
///
/// Timestamps are offsets from trial start.
#[derive(Debug, Default)]
pub struct MilestoneTracker {
    first_event_at: Option<Duration>,
    first_content_at: Option<Duration>,
    ended_at: Option<Duration>,
    usage: Usage,
    event_counts: BTreeMap<String, u32>,
}

impl MilestoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event observed at `at`. Returns `true` if it was the
    /// terminal event.
    pub fn observe(&mut self, event: &DecodedEvent, at: Duration) -> bool {
        *self.event_counts.entry(event.name.clone()).or_insert(0) += 1;
        self.first_event_at.get_or_insert(at);

        let typed = StreamEvent::classify(event);
        match &typed {
            StreamEvent::ContentDelta => {
                self.first_content_at.get_or_insert(at);
            }
            StreamEvent::MessageStart { usage: Some(update) }
            | StreamEvent::MessageDelta { usage: Some(update) } => {
                self.usage.apply(update);
            }
            StreamEvent::MessageStop => {
                self.ended_at.get_or_insert(at);
            }
            _ => {}
        }
        typed.is_terminal()
    }

    /// The terminal event has been observed.
    pub fn is_complete(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn first_event_at(&self) -> Option<Duration> {
        self.first_event_at
    }

    pub fn first_content_at(&self) -> Option<Duration> {
        self.first_content_at
    }

    pub fn ended_at(&self) -> Option<Duration> {
        self.ended_at
    }

    /// First content fragment, falling back to the first event of any kind.
    pub fn time_to_first_content(&self) -> Option<Duration> {
        self.first_content_at.or(self.first_event_at)
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn event_counts(&self) -> &BTreeMap<String, u32> {
        &self.event_counts
    }

    /// Rounded timings given the instant the read loop stopped.
    pub fn timings(&self, stopped_at: Duration) -> Timings {
        Timings {
            ttft_ms: self.time_to_first_content().map(round_ms),
            total_ms: Some(round_ms(self.ended_at.unwrap_or(stopped_at))),
        }
    }

    pub fn into_event_counts(self) -> BTreeMap<String, u32> {
        self.event_counts
    }
}
