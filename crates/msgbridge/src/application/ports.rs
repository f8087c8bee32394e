//! Ports: the two traits the bridge needs from its transport.
//!
//! The concrete tokio-backed implementations live in
//! [`crate::infrastructure`]; tests substitute their own.

use async_trait::async_trait;

use crate::domain::{DecoderEvent, SinkError, SinkFailure};

/// Write side of the transport.
///
/// # Flush contract
///
/// The bridge asks [`is_writable`](Self::is_writable) once per flush.  If the
/// answer is yes it writes every queued frame in one go, so a sink that says
/// yes must be able to take the whole backlog.  Backpressure is expressed by
/// saying no *before* the flush, never by refusing a write half-way through.
///
/// Sinks that deliver asynchronously report late failures through
/// [`take_failure`](Self::take_failure), which the bridge polls at the start
/// of every flush.
#[cfg_attr(test, mockall::automock)]
pub trait OutboundSink: Send {
    /// `true` if the sink can accept the current backlog right now.
    fn is_writable(&self) -> bool;

    /// `true` once the sink can never accept frames again.
    fn is_closed(&self) -> bool;

    /// Writes one serialized frame (no delimiter).
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the frame could not be accepted.  The bridge
    /// puts the frame back at the head of its queue.
    fn write(&mut self, frame: &str) -> Result<(), SinkError>;

    /// Takes a failure that happened after earlier writes were accepted.
    ///
    /// Returns `None` for sinks that write synchronously; [`write`](Self::write)
    /// already reported their errors.
    fn take_failure(&mut self) -> Option<SinkFailure> {
        None
    }
}

/// Read side of the transport, already decoded into JSON values.
///
/// Returning `None` means the stream has ended; the bridge then stops polling
/// and marks itself offline.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next decoded frame or stream error.
    async fn next_event(&mut self) -> Option<DecoderEvent>;
}
