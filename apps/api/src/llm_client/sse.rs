//! Line framing for `text/event-stream` completion bodies.
//!
//! `SseDecoder` is a plain accumulator: the transport pushes raw byte slices in
//! and gets back whatever frames became complete. A network read may end in the
//! middle of a line (or of a multi-byte character); the unfinished tail stays in
//! the buffer until the next push.

use bytes::{Buf, BytesMut};
use tracing::warn;

use super::types::StreamChunk;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "data: [DONE]";

#[derive(Debug, Clone)]
pub enum SseFrame {
    Chunk(StreamChunk),
    /// The `data: [DONE]` sentinel. Nothing after it is decoded.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Appends `bytes` and decodes every complete line now in the buffer.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }
        self.buf.extend_from_slice(bytes);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos);
            self.buf.advance(1);
            if self.decode_into(&line, &mut frames) {
                break;
            }
        }
        frames
    }

    /// Decodes whatever is left once the transport has closed.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        if !self.done && !self.buf.is_empty() {
            let rest = self.buf.split();
            self.decode_into(&rest, &mut frames);
        }
        self.buf.clear();
        frames
    }

    /// Returns true once the DONE sentinel has been seen.
    fn decode_into(&mut self, raw: &[u8], frames: &mut Vec<SseFrame>) -> bool {
        match decode_line(raw) {
            Some(SseFrame::Done) => {
                self.done = true;
                self.buf.clear();
                frames.push(SseFrame::Done);
                true
            }
            Some(frame) => {
                frames.push(frame);
                false
            }
            None => false,
        }
    }
}

/// Decodes one logical line. Blank lines, comments, non-`data:` fields and
/// malformed payloads yield `None`; malformed payloads are logged.
pub fn decode_line(raw: &[u8]) -> Option<SseFrame> {
    let line = match std::str::from_utf8(raw) {
        Ok(s) => s.trim(),
        Err(e) => {
            warn!("Skipping non UTF-8 stream line: {e}");
            return None;
        }
    };

    if line.is_empty() {
        return None;
    }
    if line == DONE_SENTINEL {
        return Some(SseFrame::Done);
    }

    let payload = line.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => Some(SseFrame::Chunk(chunk)),
        Err(e) => {
            warn!("Failed to parse stream chunk: {e}; raw line: {line}");
            None
        }
    }
}
