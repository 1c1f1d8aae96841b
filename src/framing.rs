//! Newline framing for the inbound JSON-RPC stream
//!
//! Stdin arrives in arbitrary chunks: a single read may hold half a message,
//! several messages, or injected terminal noise. [`FrameReader`] owns the
//! accumulation buffer and turns chunks into decoded [`Request`]s, dropping
//! anything that is not a well-formed request. Noise must never terminate
//! the stream.

use tracing::debug;

use crate::protocol::Request;

/// Splits an arbitrarily chunked byte stream into decoded requests.
///
/// The buffer is the only state carried between chunks; everything after the
/// last newline of a chunk waits there for the rest of its line. Buffering
/// happens at the byte level so a chunk boundary may fall anywhere, even
/// inside a multi-byte character, without changing what gets decoded.
#[derive(Debug, Default)]
pub struct FrameReader {
    buffer: Vec<u8>,
}

impl FrameReader {
    /// Create a reader with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of input, returning the requests it completed.
    ///
    /// Complete lines that are not valid UTF-8 fail their JSON parse and
    /// are dropped like any other noise.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Request> {
        self.buffer.extend_from_slice(chunk);

        let mut requests = Vec::new();
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let frame = String::from_utf8_lossy(&line[..end]);
            if let Some(request) = Self::decode(frame.trim()) {
                requests.push(request);
            }
        }
        requests
    }

    fn decode(frame: &str) -> Option<Request> {
        if frame.is_empty() {
            // keep-alive noise, not an error
            return None;
        }
        match serde_json::from_str::<Request>(frame) {
            Ok(request) => Some(request),
            Err(err) => {
                debug!("dropping undecodable frame: {err}");
                None
            }
        }
    }
}
