//! Error taxonomy for the bridge.
//!
//! | Error                      | Raised how                         | Recoverable?            |
//! |----------------------------|------------------------------------|-------------------------|
//! | `AlreadyBound`             | `Err` from `bind_*`                | No, programmer error    |
//! | `NoRuntime`                | `Err` from `bind_inbound`          | No, programmer error    |
//! | `Serialization`            | `Err` from `send`                  | Caller fixes payload    |
//! | `Malformed`                | `error` event                      | Inbound keeps running   |
//! | `Decoder`                  | `error` event                      | Depends on the variant  |
//! | `Transport`                | `error` event                      | Frame requeued at head  |
//!
//! A sink that is missing or not writable is *not* an error: the flush logs a
//! warning, leaves the queue alone and reports it through
//! [`FlushOutcome`](crate::domain::FlushOutcome).

use std::fmt;

use msgbridge_core::{CodecError, MalformedMessage};
use thiserror::Error;

/// Which side of the bridge a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// Failures reported by the inbound decoder.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A line could not be decoded (bad JSON, or over the frame limit).  The
    /// decoder moves on to the next line.
    #[error(transparent)]
    Frame(#[from] CodecError),

    /// The underlying reader failed.  The decoder stops after reporting it.
    #[error("inbound stream read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// `true` if the decoder cannot produce further frames after this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DecodeError::Io(_))
    }
}

/// Failures reported by an outbound sink's `write`.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side of the sink is gone.
    #[error("message sink is closed")]
    Closed,

    /// The sink has no room for another frame right now.
    #[error("message sink is full")]
    Full,

    /// The sink's own I/O failed.
    #[error("message sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Every error the bridge returns or publishes.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A second stream was bound for a direction that already has one.
    #[error("{0} stream is already bound")]
    AlreadyBound(Direction),

    /// `bind_inbound` was called outside a tokio runtime.
    #[error("bind_inbound requires a running tokio runtime")]
    NoRuntime,

    /// An inbound value did not have the `[name, content]` shape.
    #[error(transparent)]
    Malformed(#[from] MalformedMessage),

    /// The inbound decoder reported a stream-level problem.
    #[error("decoder error: {0}")]
    Decoder(#[from] DecodeError),

    /// Writing a queued frame to the sink failed.
    #[error("transport error: {0}")]
    Transport(#[from] SinkError),

    /// An outbound payload could not be serialized.
    #[error(transparent)]
    Serialization(CodecError),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
