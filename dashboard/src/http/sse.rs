//! Server-sent events decoding for the log stream

use clue_api::models::StreamPayload;

/// Incremental `text/event-stream` decoder.
///
/// Bytes are buffered until a full line is available so multi-byte characters
/// split across network chunks decode correctly. Only `data:` fields are
/// kept; an event is dispatched on the blank line that ends it.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the data of every event it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                self.data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
            // comments (":") and other fields are ignored
        }

        events
    }

    /// Flush an event left unterminated when the stream ends
    pub fn finish(&mut self) -> Option<String> {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            let line = String::from_utf8_lossy(&rest);
            if let Some(data) = line.trim_end_matches('\r').strip_prefix("data:") {
                self.data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
        }
        if self.data.is_empty() {
            None
        } else {
            let event = self.data.join("\n");
            self.data.clear();
            Some(event)
        }
    }
}

/// One decoded log stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Line(String),
    Error(String),
}

impl LogEvent {
    /// `{"log": ..}` and `{"error": ..}` payloads are unwrapped, anything else is a plain line
    pub fn parse(data: &str) -> Self {
        match serde_json::from_str::<StreamPayload>(data) {
            Ok(StreamPayload::Log { log }) => LogEvent::Line(log),
            Ok(StreamPayload::Error { error }) => LogEvent::Error(error),
            Err(_) => LogEvent::Line(data.to_string()),
        }
    }
}
