//! Event infrastructure: typed classification of decoded stream events.

pub mod messages;

pub use messages::{StreamEvent, UsageUpdate};
