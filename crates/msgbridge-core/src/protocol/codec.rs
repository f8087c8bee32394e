//! Line-delimited JSON codec for msgbridge frames.
//!
//! Wire format:
//! ```text
//! ["name",<content JSON>]\n["name",<content JSON>]\n...
//! ```
//! One frame per line, UTF-8, terminated by `\n`.  A `\r` before the newline
//! and blank lines are tolerated on input.  Outbound frames are produced by
//! [`encode_frame`] *without* the delimiter; the transport appends it.
//!
//! # Why a buffer is needed
//!
//! A byte stream has no notion of message boundaries: one `read()` may return
//! half a frame, or three frames and the start of a fourth.  [`FrameBuffer`]
//! accumulates bytes and hands back complete frames one at a time, so the
//! async decoder never has to reason about partial reads.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Byte that terminates every frame on the wire.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Default upper bound for a single frame, in bytes (1 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The outbound payload could not be represented as JSON (for example a
    /// map whose keys are not strings).
    #[error("failed to serialize message '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A complete line was received but it is not valid JSON.
    #[error("invalid JSON in frame #{frame}: {source}")]
    InvalidJson {
        frame: u64,
        #[source]
        source: serde_json::Error,
    },

    /// A line exceeded the configured frame limit and was discarded.
    #[error("frame exceeds {limit} bytes and was discarded")]
    FrameTooLong { limit: usize },
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serializes `name` and `content` into one wire frame (no delimiter).
///
/// # Errors
///
/// Returns [`CodecError::Serialize`] if `content` cannot be converted to JSON.
///
/// # Examples
///
/// ```rust
/// use msgbridge_core::encode_frame;
///
/// let frame = encode_frame("greet", &serde_json::json!({"who": "world"})).unwrap();
/// assert_eq!(frame, r#"["greet",{"who":"world"}]"#);
/// ```
pub fn encode_frame<T>(name: &str, content: &T) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(&(name, content)).map_err(|source| CodecError::Serialize {
        name: name.to_string(),
        source,
    })
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Accumulates raw bytes and splits them into decoded JSON frames.
///
/// Decoding is "safe": a bad line produces one error and the buffer moves on
/// to the next line.  An oversized line is dropped up to its delimiter, so a
/// peer that never sends `\n` cannot grow the buffer without bound.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    max_frame_bytes: usize,
    /// Set while skipping the tail of an oversized line.
    discarding: bool,
    frames_seen: u64,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl FrameBuffer {
    /// Creates an empty buffer that rejects lines longer than `max_frame_bytes`.
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(4096),
            max_frame_bytes,
            discarding: false,
            frames_seen: 0,
        }
    }

    /// Appends freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Number of non-blank frames handed out so far (valid or not).
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Returns the next complete frame, or `None` if more bytes are needed.
    ///
    /// Call in a loop after every [`extend`](Self::extend): one read may have
    /// delivered several frames.
    pub fn next_frame(&mut self) -> Option<Result<Value, CodecError>> {
        loop {
            let Some(pos) = self.buf.iter().position(|&b| b == FRAME_DELIMITER) else {
                return self.check_unterminated();
            };

            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if self.discarding {
                // End of an oversized line that was already reported.
                self.discarding = false;
                continue;
            }

            let line = &line[..pos];
            if is_blank(line) {
                continue;
            }
            if line.len() > self.max_frame_bytes {
                debug!(len = line.len(), limit = self.max_frame_bytes, "oversized frame dropped");
                return Some(Err(CodecError::FrameTooLong {
                    limit: self.max_frame_bytes,
                }));
            }
            return Some(self.parse(line));
        }
    }

    /// Flushes a final frame that arrived without a trailing delimiter.
    ///
    /// Call once at end of stream, after [`next_frame`](Self::next_frame) has
    /// returned `None`.
    pub fn finish(&mut self) -> Option<Result<Value, CodecError>> {
        let rest = std::mem::take(&mut self.buf);
        if std::mem::take(&mut self.discarding) || is_blank(&rest) {
            return None;
        }
        Some(self.parse(&rest))
    }

    fn check_unterminated(&mut self) -> Option<Result<Value, CodecError>> {
        if self.discarding {
            self.buf.clear();
            return None;
        }
        if self.buf.len() > self.max_frame_bytes {
            debug!(limit = self.max_frame_bytes, "unterminated frame over limit, discarding to next delimiter");
            self.buf.clear();
            self.discarding = true;
            return Some(Err(CodecError::FrameTooLong {
                limit: self.max_frame_bytes,
            }));
        }
        None
    }

    fn parse(&mut self, line: &[u8]) -> Result<Value, CodecError> {
        self.frames_seen += 1;
        serde_json::from_slice(line).map_err(|source| CodecError::InvalidJson {
            frame: self.frames_seen,
            source,
        })
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
