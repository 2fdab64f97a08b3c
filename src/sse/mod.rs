//! Server-sent event stream handling: byte chunks -> frames -> decoded events.

pub mod codec;

pub use codec::{decode_frame, DecodedEvent, EventPayload, FrameSplitter};
