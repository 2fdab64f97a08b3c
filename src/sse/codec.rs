//! Frame codec for the server-sent event wire protocol.
//!
//! Frame format:
//! ```text
//! event: content_block_delta\n
//! data: {"type":"content_block_delta", ...}\n
//! \n                                   <- blank line terminates the frame
//! ```
//! A frame may carry several `data:` lines; their bodies are joined with `\n`.
//! Frames without an `event:` line or without data (heartbeat comments,
//! keep-alives) are not protocol events.

use serde_json::Value;

/// Prefix of the event-name line.
pub const EVENT_MARKER: &str = "event:";
/// Prefix of each data line.
pub const DATA_MARKER: &str = "data:";
/// Frame terminator (one blank line).
pub const FRAME_TERMINATOR: &str = "\n\n";

/// Incremental splitter from raw byte chunks to complete text frames.
///
/// Chunks may arrive at any size, including ones that split a multi-byte
/// UTF-8 sequence or the terminator itself. Only text after the last
/// extracted frame is retained, so memory is bounded by the largest frame
/// rather than the stream length.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    /// Decoded text not yet emitted as a frame.
    text: String,
    /// Offset in `text` where the next terminator search starts.
    scan_from: usize,
    /// Trailing bytes of an incomplete UTF-8 sequence (at most 3).
    pending: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every frame completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode_into_buffer(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(rel) = self.text[self.scan_from..].find(FRAME_TERMINATOR) {
            let end = self.scan_from + rel;
            frames.push(self.text[consumed..end].to_string());
            consumed = end + FRAME_TERMINATOR.len();
            self.scan_from = consumed;
        }
        if consumed > 0 {
            self.text.drain(..consumed);
        }

        // A trailing '\n' may pair with a '\n' at the start of the next chunk.
        self.scan_from = if self.text.ends_with('\n') {
            self.text.len() - 1
        } else {
            self.text.len()
        };

        frames
    }

    /// Number of buffered bytes that have not yet formed a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.text.len() + self.pending.len()
    }

    /// End of stream. Unterminated residue is discarded; returns its size.
    pub fn finish(self) -> usize {
        self.buffered_len()
    }

    /// Lossy streaming UTF-8 decode: invalid sequences become U+FFFD, an
    /// incomplete trailing sequence waits for the next chunk.
    fn decode_into_buffer(&mut self, chunk: &[u8]) {
        let joined;
        let mut input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut bytes = std::mem::take(&mut self.pending);
            bytes.extend_from_slice(chunk);
            joined = bytes;
            &joined
        };

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    return;
                }
                Err(e) => {
                    let valid_len = e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&input[..valid_len]));
                    match e.error_len() {
                        Some(bad_len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            input = &input[valid_len + bad_len..];
                        }
                        None => {
                            self.pending = input[valid_len..].to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Payload of a decoded event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Data text parsed as JSON.
    Json(Value),
    /// Data text that failed to parse; kept verbatim.
    Raw(String),
}

/// One protocol event decoded from a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub name: String,
    pub payload: EventPayload,
}

impl DecodedEvent {
    /// Parsed payload, if the data text was valid JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.payload {
            EventPayload::Json(value) => Some(value),
            EventPayload::Raw(_) => None,
        }
    }

    /// Undecoded data text, if parsing failed.
    pub fn raw_text(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Json(_) => None,
            EventPayload::Raw(text) => Some(text),
        }
    }
}

/// Decode one frame.
///
/// Returns `None` when the frame has no event line, no data lines, or empty
/// data. Invalid JSON still yields an event with [`EventPayload::Raw`].
pub fn decode_frame(frame: &str) -> Option<DecodedEvent> {
    let mut name: Option<&str> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.split('\n') {
        if let Some(rest) = line.strip_prefix(EVENT_MARKER) {
            if name.is_none() {
                name = Some(rest.trim());
            }
        } else if let Some(rest) = line.strip_prefix(DATA_MARKER) {
            data_lines.push(rest.trim());
        }
    }

    let name = name?;
    if data_lines.is_empty() {
        return None;
    }
    let data = data_lines.join("\n");
    if data.is_empty() {
        return None;
    }

    let payload = match serde_json::from_str::<Value>(&data) {
        Ok(value) => EventPayload::Json(value),
        Err(_) => EventPayload::Raw(data),
    };

    Some(DecodedEvent {
        name: name.to_string(),
        payload,
    })
}
