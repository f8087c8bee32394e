//! Event payloads passed between the bridge and its collaborators.
//!
//! None of these types do any work; they only carry what happened from the
//! layer that observed it to the layer that reacts to it:
//!
//! | Type           | Produced by             | Consumed by                 |
//! |----------------|-------------------------|-----------------------------|
//! | `DecoderEvent` | an inbound frame source | the bridge's inbound task   |
//! | `SinkFailure`  | an outbound sink        | the bridge's next flush     |
//! | `FlushOutcome` | the bridge              | the caller of `send`/`flush`|

use serde_json::Value;

use crate::domain::error::{DecodeError, SinkError};

/// One item produced by an inbound frame source.
#[derive(Debug)]
pub enum DecoderEvent {
    /// A complete frame decoded into a JSON value (shape not yet checked).
    Frame(Value),
    /// A stream-level problem; forwarded to error listeners as-is.
    Error(DecodeError),
}

/// A sink failure that happened after the bridge handed frames over.
///
/// Sinks that deliver asynchronously (a channel drained by a writer task)
/// accept a frame before the real write happens.  When that later write
/// fails, the sink keeps the error together with every frame it accepted but
/// never delivered, and hands both to the bridge on its next flush.  The
/// bridge puts `unsent` back at the head of its queue and publishes `error`
/// as a transport error.
#[derive(Debug)]
pub struct SinkFailure {
    /// What went wrong in the sink's own I/O.
    pub error: SinkError,
    /// Frames accepted but not delivered, oldest first.  The frame whose
    /// write failed is first; it may have been partially written.
    pub unsent: Vec<String>,
}

/// What a single flush attempt did.
///
/// `Failed` is the only outcome accompanied by an `error` event.
/// `SinkUnbound` and `SinkNotWritable` are soft conditions: the queue is kept
/// untouched and the next trigger (a `send`, or an explicit `flush`) retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Every queued frame was written; carries the number written.
    Drained(usize),
    /// No outbound sink has been bound yet.
    SinkUnbound,
    /// The sink refused the flush (backpressure or closed); nothing was written.
    SinkNotWritable,
    /// A write failed, or the sink reported an earlier failure, after
    /// `written` frames from this attempt were delivered.  Undelivered frames
    /// are back at the head of the queue.
    Failed { written: usize },
}

impl FlushOutcome {
    /// Number of frames this attempt delivered.
    pub fn written(&self) -> usize {
        match *self {
            FlushOutcome::Drained(n) => n,
            FlushOutcome::SinkUnbound | FlushOutcome::SinkNotWritable => 0,
            FlushOutcome::Failed { written } => written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_counts_per_outcome() {
        assert_eq!(FlushOutcome::Drained(3).written(), 3);
        assert_eq!(FlushOutcome::SinkUnbound.written(), 0);
        assert_eq!(FlushOutcome::SinkNotWritable.written(), 0);
        assert_eq!(FlushOutcome::Failed { written: 1 }.written(), 1);
    }
}
