//! Inbound decoding: raw bytes in, JSON values out.
//!
//! # Streaming
//!
//! A single `read()` may return part of a frame, or several frames.  Bytes
//! are accumulated in a [`FrameBuffer`] and complete lines are pulled out of
//! it one at a time, so a read boundary can fall anywhere.
//!
//! # Safety
//!
//! Nothing the peer sends can make the decoder panic or stop early:
//!
//! | Input                      | Event                                 | Then        |
//! |----------------------------|---------------------------------------|-------------|
//! | valid JSON line            | `Frame(value)`                        | next line   |
//! | invalid JSON line          | `Error(Frame(InvalidJson))`           | next line   |
//! | line over the size limit   | `Error(Frame(FrameTooLong))`          | next line   |
//! | read error                 | `Error(Io)`                           | stream ends |
//! | EOF                        | last unterminated frame, if any       | stream ends |

use async_trait::async_trait;
use msgbridge_core::{CodecError, FrameBuffer};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::ports::FrameSource;
use crate::domain::{DecodeError, DecoderEvent};

const READ_CHUNK: usize = 8 * 1024;

/// Newline-delimited JSON decoder over any tokio reader.
pub struct SafeFramedDecoder<R> {
    reader: R,
    frames: FrameBuffer,
    chunk: Box<[u8]>,
    finished: bool,
}

impl<R> SafeFramedDecoder<R>
where
    R: AsyncRead + Unpin,
{
    /// Wraps `reader`; lines longer than `max_frame_bytes` are rejected.
    pub fn new(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader,
            frames: FrameBuffer::new(max_frame_bytes),
            chunk: vec![0u8; READ_CHUNK].into_boxed_slice(),
            finished: false,
        }
    }

    /// Reads until one event is available.  `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<DecoderEvent> {
        loop {
            if let Some(frame) = self.frames.next_frame() {
                return Some(to_event(frame));
            }
            if self.finished {
                return None;
            }

            match self.reader.read(&mut self.chunk).await {
                Ok(0) => {
                    self.finished = true;
                    debug!(frames = self.frames.frames_seen(), "inbound reader reached EOF");
                    return self.frames.finish().map(to_event);
                }
                Ok(n) => self.frames.extend(&self.chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(DecoderEvent::Error(DecodeError::Io(e)));
                }
            }
        }
    }

    /// Number of frames (valid or not) decoded so far.
    pub fn frames_seen(&self) -> u64 {
        self.frames.frames_seen()
    }
}

fn to_event(frame: Result<Value, CodecError>) -> DecoderEvent {
    match frame {
        Ok(value) => DecoderEvent::Frame(value),
        Err(e) => DecoderEvent::Error(DecodeError::Frame(e)),
    }
}

#[async_trait]
impl<R> FrameSource for SafeFramedDecoder<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_event(&mut self) -> Option<DecoderEvent> {
        SafeFramedDecoder::next_event(self).await
    }
}

/// Object-mode input: values arrive already decoded.
#[async_trait]
impl FrameSource for mpsc::Receiver<Value> {
    async fn next_event(&mut self) -> Option<DecoderEvent> {
        self.recv().await.map(DecoderEvent::Frame)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
